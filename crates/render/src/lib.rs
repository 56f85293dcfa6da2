#![deny(missing_docs)]
//! mdpost rendering: element tree, tree rewrites, highlighting, and the
//! post pipeline.

/// Markdown tree to element tree conversion.
pub mod convert;
/// Rendered element tree and HTML serialization.
pub mod hast;
/// Code block syntax highlighting.
pub mod highlight;
/// Stage orchestration.
pub mod pipeline;
/// Tree rewrites (TOC, media URLs, heading anchors, link attributes).
pub mod transform;

pub use convert::to_hast;
pub use highlight::{HighlightError, Highlighter, SyntectHighlighter, highlight_code_blocks};
pub use pipeline::{Pipeline, PipelineOptions, RenderedPost, default_language_aliases};
pub use transform::DocumentContext;
pub use transform::anchors::decorate_headings;
pub use transform::links::apply_link_attributes;
pub use transform::media::{is_relative_url, rewrite_image_urls, rewrite_raw_media_urls};
pub use transform::toc::{insert_table_of_contents, is_toc_placeholder};
