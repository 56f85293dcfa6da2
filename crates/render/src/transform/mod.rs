//! Tree rewrites applied by the pipeline.
//!
//! - `toc`: replaces `{% toc %}` paragraphs with a nested list of headings.
//! - `media`: rebases relative image and video URLs under the post's slug.
//! - `anchors`: gives headings ids and a permalink anchor.
//! - `links`: stamps configured attributes on every link.

/// Heading anchors and permalinks.
pub mod anchors;
/// Extra attributes on links.
pub mod links;
/// Relative media URL rewriting.
pub mod media;
/// Table of contents synthesis.
pub mod toc;

/// Per-document state threaded through every stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentContext {
    slug: Option<String>,
}

impl DocumentContext {
    /// Context for the post stored under `slug`.
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
        }
    }

    /// Context without a slug; slug-dependent stages become no-ops.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The post slug, if one is set and non-empty.
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref().filter(|slug| !slug.is_empty())
    }
}
