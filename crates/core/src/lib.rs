#![deny(missing_docs)]
//! mdpost core: markdown parsing, slugs, heading outlines, and front matter.

/// Core error types.
pub mod error;
/// YAML front matter decoding.
pub mod frontmatter;
/// Heading outline reconstruction.
pub mod outline;
/// Markdown parsing and plain-text helpers.
pub mod parse;
/// Slug generation utilities.
pub mod slug;
/// Generic mdast traversal.
pub mod walk;

pub use error::{MdpostError, SourceLocation};
pub use frontmatter::{
    FrontmatterError, MISSING_FRONTMATTER, PostMetadata, extract_frontmatter, parse_metadata,
    take_frontmatter,
};
pub use outline::{OutlineNode, build_outline, collect_headings, outline_of};
pub use parse::{
    ParseOptions, heading_text, parse_mdast, parse_mdast_with_options, plain_text, plain_text_of,
};
pub use slug::{sanitize_document_id, slugify};
pub use walk::{NodePath, collect_paths, node_at, node_at_mut, replace_at, walk, walk_mut};
