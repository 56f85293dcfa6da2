//! Post rendering pipeline.
//!
//! Stage order is fixed:
//!
//! 1. parse markdown (GFM, YAML front matter, raw HTML)
//! 2. decode and strip front matter; without it the post renders as the
//!    missing-front-matter sentinel and nothing else runs
//! 3. rebase relative image URLs (markdown tree)
//! 4. replace `{% toc %}` placeholders (markdown tree)
//! 5. convert to the rendered element tree
//! 6. highlight code blocks
//! 7. rebase relative media URLs inside raw HTML
//! 8. add heading ids and permalinks
//! 9. stamp configured link attributes
//! 10. serialize to HTML
//!
//! A [`Pipeline`] is immutable after construction and can be shared between
//! threads; each call works on its own freshly parsed tree.

use crate::convert::to_hast;
use crate::hast;
use crate::highlight::{Highlighter, SyntectHighlighter, highlight_code_blocks};
use crate::transform::DocumentContext;
use crate::transform::anchors::decorate_headings;
use crate::transform::links::apply_link_attributes;
use crate::transform::media::{
    default_raw_media_attributes, rewrite_image_urls, rewrite_raw_media_urls,
};
use crate::transform::toc::insert_table_of_contents;
use markdown::mdast;
use mdpost_core::{
    MISSING_FRONTMATTER, MdpostError, ParseOptions, PostMetadata, extract_frontmatter,
    parse_mdast, take_frontmatter,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Whether fenced code blocks are syntax highlighted.
    #[serde(default = "default_highlight")]
    pub highlight: bool,
    /// Code fence language aliases, keyed by lowercase hint.
    #[serde(default = "default_language_aliases")]
    pub language_aliases: BTreeMap<String, String>,
    /// Attributes set on every rendered link, heading permalinks included.
    #[serde(default)]
    pub link_attributes: BTreeMap<String, String>,
    /// Tag → URL attribute pairs rebased inside raw HTML.
    #[serde(default = "default_raw_media_attributes")]
    pub raw_media_attributes: BTreeMap<String, String>,
}

fn default_highlight() -> bool {
    true
}

/// Aliases mapping common fence hints onto grammar names.
pub fn default_language_aliases() -> BTreeMap<String, String> {
    [
        ("svelte", "html"),
        ("vue", "html"),
        ("sh", "bash"),
        ("shell", "bash"),
        ("zsh", "bash"),
        ("console", "bash"),
        ("yml", "yaml"),
        ("jsonc", "json"),
        ("py", "python"),
        ("rs", "rust"),
    ]
    .into_iter()
    .map(|(alias, target)| (alias.to_string(), target.to_string()))
    .collect()
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            highlight: default_highlight(),
            language_aliases: default_language_aliases(),
            link_attributes: BTreeMap::new(),
            raw_media_attributes: default_raw_media_attributes(),
        }
    }
}

/// A rendered post: decoded metadata plus the final HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPost {
    /// Front matter, or the sentinel record when it was missing.
    pub metadata: PostMetadata,
    /// Serialized HTML body.
    pub content: String,
}

impl RenderedPost {
    /// The result for a post without usable front matter.
    pub fn missing_frontmatter() -> Self {
        Self {
            metadata: PostMetadata::missing(),
            content: MISSING_FRONTMATTER.to_string(),
        }
    }
}

/// Configured, reusable post renderer.
pub struct Pipeline {
    options: PipelineOptions,
    parse_options: ParseOptions,
    highlighter: Box<dyn Highlighter>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}

impl Pipeline {
    /// Creates a pipeline using the syntect highlighter.
    pub fn new(options: PipelineOptions) -> Self {
        Self::with_highlighter(options, Box::new(SyntectHighlighter::new()))
    }

    /// Creates a pipeline with a custom highlighter backend.
    pub fn with_highlighter(options: PipelineOptions, highlighter: Box<dyn Highlighter>) -> Self {
        Self {
            options,
            parse_options: ParseOptions::post(),
            highlighter,
        }
    }

    /// Returns the pipeline configuration.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Parses markdown source into the markdown tree.
    pub fn parse(&self, source: &str) -> Result<mdast::Node, MdpostError> {
        parse_mdast(source, &self.parse_options)
    }

    /// Renders a post end to end.
    ///
    /// Missing or malformed front matter is not an error: the sentinel
    /// metadata and body are returned instead.
    pub fn render(
        &self,
        source: &str,
        ctx: &DocumentContext,
    ) -> Result<RenderedPost, MdpostError> {
        let mut root = self.parse(source).map_err(|err| match ctx.slug() {
            Some(slug) => err.in_document(slug),
            None => err,
        })?;

        let metadata = match take_frontmatter(&mut root) {
            Ok(metadata) => metadata,
            Err(err) => {
                log::warn!(
                    "Post {:?} has no usable frontmatter: {err}",
                    ctx.slug().unwrap_or("<anonymous>")
                );
                return Ok(RenderedPost::missing_frontmatter());
            }
        };

        self.transform_markdown(&mut root, ctx);
        let mut tree = to_hast(&root);
        self.transform_rendered(&mut tree, ctx);

        Ok(RenderedPost {
            metadata,
            content: tree.to_html(),
        })
    }

    /// Renders a post from raw bytes, which must be UTF-8.
    pub fn render_bytes(
        &self,
        bytes: Vec<u8>,
        ctx: &DocumentContext,
    ) -> Result<RenderedPost, MdpostError> {
        let source = String::from_utf8(bytes)?;
        self.render(&source, ctx)
    }

    /// Decodes only the metadata of a post, for listings.
    ///
    /// Falls back to the sentinel record like [`Pipeline::render`].
    pub fn read_metadata(&self, source: &str) -> Result<PostMetadata, MdpostError> {
        let root = self.parse(source)?;
        Ok(extract_frontmatter(&root).unwrap_or_else(|err| {
            log::warn!("Using placeholder metadata: {err}");
            PostMetadata::missing()
        }))
    }

    /// Markdown-tree stages: image URL rebasing, then TOC synthesis.
    pub fn transform_markdown(&self, root: &mut mdast::Node, ctx: &DocumentContext) {
        rewrite_image_urls(root, ctx);
        insert_table_of_contents(root);
    }

    /// Element-tree stages: highlighting, raw media rebasing, heading
    /// anchors, link attributes.
    pub fn transform_rendered(&self, tree: &mut hast::Node, ctx: &DocumentContext) {
        if self.options.highlight {
            highlight_code_blocks(
                tree,
                self.highlighter.as_ref(),
                &self.options.language_aliases,
            );
        }
        rewrite_raw_media_urls(tree, ctx, &self.options.raw_media_attributes);
        decorate_headings(tree);
        apply_link_attributes(tree, &self.options.link_attributes);
    }
}
