//! Relative media URL rewriting.
//!
//! Post assets live next to the post, so a relative `pic.png` in post
//! `my-post` must be served as `./my-post/pic.png`. Image nodes are rewritten
//! on the markdown tree; `<video src>` and other configured tag/attribute pairs
//! are rewritten inside raw HTML blocks after conversion.

use super::DocumentContext;
use crate::hast::{self, visit_raw_mut};
use lol_html::{RewriteStrSettings, Selector, element, rewrite_str};
use markdown::mdast::Node;
use mdpost_core::walk_mut;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use url::Url;

const RELATIVE_BASE_URL: &str = "http://is-relative.com";

fn relative_base() -> Option<&'static Url> {
    static BASE: OnceLock<Option<Url>> = OnceLock::new();
    BASE.get_or_init(|| Url::parse(RELATIVE_BASE_URL).ok())
        .as_ref()
}

/// Returns true when `url` carries no origin of its own.
///
/// The URL is resolved against a fixed base; it is relative when the result
/// keeps the base's origin. URLs that fail to resolve count as absolute.
pub fn is_relative_url(url: &str) -> bool {
    let Some(base) = relative_base() else {
        return false;
    };
    base.join(url)
        .map(|resolved| resolved.origin() == base.origin())
        .unwrap_or(false)
}

/// Prefixes a relative URL with the post's asset directory.
pub fn rebase_url(slug: &str, url: &str) -> String {
    format!("./{slug}/{url}")
}

/// Rewrites relative image URLs on the markdown tree.
///
/// Returns the number of rewritten images; a context without a slug
/// rewrites nothing.
pub fn rewrite_image_urls(root: &mut Node, ctx: &DocumentContext) -> usize {
    let Some(slug) = ctx.slug() else {
        return 0;
    };
    let mut rewritten = 0;
    walk_mut(
        root,
        |node| matches!(node, Node::Image(_)),
        |node, _| {
            if let Node::Image(image) = node
                && is_relative_url(&image.url)
            {
                let rebased = rebase_url(slug, &image.url);
                log::debug!("Rewriting image {} -> {}", image.url, rebased);
                image.url = rebased;
                rewritten += 1;
            }
        },
    );
    rewritten
}

/// Tag/attribute pairs rewritten inside raw HTML by default.
pub fn default_raw_media_attributes() -> BTreeMap<String, String> {
    BTreeMap::from([("video".to_string(), "src".to_string())])
}

/// Rewrites relative URLs in one fragment of raw HTML.
///
/// Returns `None` when no attribute changed, so untouched markup is never
/// re-serialized.
pub fn rewrite_html_fragment(
    html: &str,
    slug: &str,
    attributes: &BTreeMap<String, String>,
) -> Option<String> {
    let changed = Cell::new(false);
    let mut handlers = Vec::with_capacity(attributes.len());

    for (tag, attr) in attributes {
        let selector = format!("{tag}[{attr}]");
        if let Err(err) = selector.parse::<Selector>() {
            log::warn!("Skipping media selector {selector:?}: {err}");
            continue;
        }
        let changed = &changed;
        handlers.push(element!(selector, move |el| {
            if let Some(url) = el.get_attribute(attr)
                && is_relative_url(&url)
            {
                el.set_attribute(attr, &rebase_url(slug, &url))?;
                changed.set(true);
            }
            Ok(())
        }));
    }

    if handlers.is_empty() {
        return None;
    }

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::new()
        },
    );

    match output {
        Ok(rewritten) if changed.get() => Some(rewritten),
        Ok(_) => None,
        Err(err) => {
            log::warn!("Leaving raw HTML untouched: {err}");
            None
        }
    }
}

/// Rewrites relative media URLs inside every raw HTML node of the rendered
/// tree. Returns the number of raw nodes that changed.
pub fn rewrite_raw_media_urls(
    tree: &mut hast::Node,
    ctx: &DocumentContext,
    attributes: &BTreeMap<String, String>,
) -> usize {
    let Some(slug) = ctx.slug() else {
        return 0;
    };
    let mut rewritten = 0;
    visit_raw_mut(tree, &mut |markup: &mut String| {
        if let Some(updated) = rewrite_html_fragment(markup, slug, attributes) {
            *markup = updated;
            rewritten += 1;
        }
    });
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpost_core::{ParseOptions, parse_mdast};

    fn image_urls(node: &Node, out: &mut Vec<String>) {
        if let Node::Image(image) = node {
            out.push(image.url.clone());
        }
        if let Some(children) = node.children() {
            for child in children {
                image_urls(child, out);
            }
        }
    }

    #[test]
    fn relative_detection() {
        assert!(is_relative_url("pic.png"));
        assert!(is_relative_url("./img/pic.png"));
        assert!(is_relative_url("/root.png"));
        assert!(is_relative_url("../up.png"));
        assert!(!is_relative_url("https://example.com/pic.png"));
        assert!(!is_relative_url("//cdn.example.com/pic.png"));
        assert!(!is_relative_url("data:image/png;base64,AAAA"));
        assert!(!is_relative_url("mailto:someone@example.com"));
    }

    #[test]
    fn unresolvable_url_is_not_relative() {
        assert!(!is_relative_url("http://[::1"));
    }

    #[test]
    fn rewrites_relative_images_only() {
        let mut root = parse_mdast(
            "![a](pic.png) ![b](https://example.com/pic.png)\n\n- ![c](nested/c.jpg)\n",
            &ParseOptions::post(),
        )
        .expect("parses");
        let ctx = DocumentContext::new("my-post");
        assert_eq!(rewrite_image_urls(&mut root, &ctx), 2);

        let mut urls = Vec::new();
        image_urls(&root, &mut urls);
        assert_eq!(
            urls,
            vec![
                "./my-post/pic.png",
                "https://example.com/pic.png",
                "./my-post/nested/c.jpg"
            ]
        );
    }

    #[test]
    fn missing_slug_is_noop() {
        let mut root =
            parse_mdast("![a](pic.png)\n", &ParseOptions::post()).expect("parses");
        let before = root.clone();
        assert_eq!(rewrite_image_urls(&mut root, &DocumentContext::anonymous()), 0);
        assert_eq!(rewrite_image_urls(&mut root, &DocumentContext::new("")), 0);
        assert_eq!(root, before);
    }

    #[test]
    fn rewrites_video_src_in_raw_html() {
        let rewritten = rewrite_html_fragment(
            "<video src=\"clip.mp4\"></video>",
            "my-post",
            &default_raw_media_attributes(),
        );
        assert_eq!(
            rewritten.as_deref(),
            Some("<video src=\"./my-post/clip.mp4\"></video>")
        );
    }

    #[test]
    fn absolute_video_src_is_untouched() {
        let html = "<video src=\"https://cdn.example.com/clip.mp4\"></video>";
        assert_eq!(
            rewrite_html_fragment(html, "my-post", &default_raw_media_attributes()),
            None
        );
    }

    #[test]
    fn raw_without_matching_tag_is_byte_identical() {
        let markup = "<div   class='x'><img src=\"a.png\"></div>";
        let mut tree = hast::Node::Root(vec![hast::Node::Raw(markup.to_string())]);
        let ctx = DocumentContext::new("my-post");
        assert_eq!(
            rewrite_raw_media_urls(&mut tree, &ctx, &default_raw_media_attributes()),
            0
        );
        assert_eq!(tree, hast::Node::Root(vec![hast::Node::Raw(markup.to_string())]));
    }

    #[test]
    fn raw_phase_without_slug_is_noop() {
        let mut tree = hast::Node::Root(vec![hast::Node::Raw(
            "<video src=\"clip.mp4\"></video>".to_string(),
        )]);
        let before = tree.clone();
        let count = rewrite_raw_media_urls(
            &mut tree,
            &DocumentContext::anonymous(),
            &default_raw_media_attributes(),
        );
        assert_eq!(count, 0);
        assert_eq!(tree, before);
    }

    #[test]
    fn configured_attributes_extend_rewriting() {
        let attributes = BTreeMap::from([
            ("video".to_string(), "poster".to_string()),
            ("audio".to_string(), "src".to_string()),
        ]);
        let rewritten = rewrite_html_fragment(
            "<video poster=\"p.jpg\" src=\"v.mp4\"></video><audio src=\"a.ogg\"></audio>",
            "post",
            &attributes,
        );
        assert_eq!(
            rewritten.as_deref(),
            Some(
                "<video poster=\"./post/p.jpg\" src=\"v.mp4\"></video><audio src=\"./post/a.ogg\"></audio>"
            )
        );
    }
}
