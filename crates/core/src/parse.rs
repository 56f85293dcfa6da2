//! Markdown parsing into mdast and plain-text flattening.

use crate::{MdpostError, SourceLocation};
use markdown::mdast::Node;
use markdown::message::{Message, Place};

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Enable YAML frontmatter parsing.
    pub frontmatter: bool,
    /// Allow raw HTML nodes in the AST.
    pub raw_html: bool,
}

impl ParseOptions {
    /// Post defaults: GFM, YAML front matter and raw HTML passthrough.
    pub const fn post() -> Self {
        Self {
            gfm: true,
            frontmatter: true,
            raw_html: true,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            frontmatter: self.frontmatter,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        markdown::ParseOptions {
            constructs,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::post()
    }
}

/// Parse markdown into an MDAST tree using core options.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, MdpostError> {
    parse_mdast_with_options(input, &options.to_markdown())
}

/// Parse markdown into an MDAST tree using markdown-rs `ParseOptions`.
pub fn parse_mdast_with_options(
    input: &str,
    options: &markdown::ParseOptions,
) -> Result<Node, MdpostError> {
    markdown::to_mdast(input, options).map_err(|err| MdpostError::MarkdownAdapter {
        message: err.to_string(),
        location: message_location(&err),
    })
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

/// Flattens a node into its plain text content.
///
/// Literal nodes contribute their value, images their alt text, and parents
/// the concatenation of their children. Nothing is trimmed.
pub fn plain_text(node: &Node) -> String {
    let mut buffer = String::new();
    push_plain_text(node, &mut buffer);
    buffer
}

/// Flattens a list of sibling nodes into plain text.
pub fn plain_text_of(nodes: &[Node]) -> String {
    let mut buffer = String::new();
    for node in nodes {
        push_plain_text(node, &mut buffer);
    }
    buffer
}

fn push_plain_text(node: &Node, buffer: &mut String) {
    match node {
        Node::Text(t) => buffer.push_str(&t.value),
        Node::InlineCode(code) => buffer.push_str(&code.value),
        Node::Code(code) => buffer.push_str(&code.value),
        Node::Html(html) => buffer.push_str(&html.value),
        Node::Yaml(yaml) => buffer.push_str(&yaml.value),
        Node::Image(image) => buffer.push_str(&image.alt),
        Node::ImageReference(image) => buffer.push_str(&image.alt),
        other => {
            if let Some(children) = other.children() {
                for child in children {
                    push_plain_text(child, buffer);
                }
            }
        }
    }
}

/// Text of a heading as it reads once rendered.
///
/// Unlike [`plain_text`], raw HTML, image alt text and footnote references
/// contribute nothing, and a hard break contributes a newline. Heading ids
/// and table of contents links are both slugified from this text.
pub fn heading_text(node: &Node) -> String {
    let mut buffer = String::new();
    push_heading_text(node, &mut buffer);
    buffer
}

fn push_heading_text(node: &Node, buffer: &mut String) {
    match node {
        Node::Text(t) => buffer.push_str(&t.value),
        Node::InlineCode(code) => buffer.push_str(&code.value),
        Node::Break(_) => buffer.push('\n'),
        Node::Html(_)
        | Node::Image(_)
        | Node::ImageReference(_)
        | Node::FootnoteReference(_) => {}
        other => {
            if let Some(children) = other.children() {
                for child in children {
                    push_heading_text(child, buffer);
                }
            }
        }
    }
}
