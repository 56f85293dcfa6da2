use markdown::mdast::Node;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body text substituted when a post has no usable front matter.
pub const MISSING_FRONTMATTER: &str = "Missing Frontmatter!";

/// Metadata decoded from a post's YAML front matter.
///
/// Only these four keys are read; anything else in the block is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetadata {
    /// Optional emoji or short icon shown before the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Post title.
    pub title: String,
    /// Publication date, ISO-like (`2021-05-01`); not validated here.
    pub date: String,
    /// Short summary shown in listings.
    pub excerpt: String,
}

impl PostMetadata {
    /// The fixed record used in place of missing or malformed front matter.
    pub fn missing() -> Self {
        Self {
            icon: None,
            title: "⚠️ Error!".to_string(),
            date: "2000-01-01".to_string(),
            excerpt: MISSING_FRONTMATTER.to_string(),
        }
    }

    /// Title prefixed with the icon, if any.
    pub fn full_title(&self) -> String {
        format!("{} {}", self.icon.as_deref().unwrap_or(""), self.title)
            .trim()
            .to_string()
    }
}

/// Errors emitted while locating or decoding front matter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// The document does not start with a YAML block.
    #[error("Document does not start with a YAML frontmatter block")]
    Missing,
    /// YAML failed to parse or lacks a required key.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Decodes the front matter of a parsed document without modifying it.
///
/// The front matter must be the first child of the root.
pub fn extract_frontmatter(root: &Node) -> Result<PostMetadata, FrontmatterError> {
    match root.children().and_then(|children| children.first()) {
        Some(Node::Yaml(yaml)) => parse_metadata(&yaml.value),
        _ => Err(FrontmatterError::Missing),
    }
}

/// Decodes the front matter and removes its node from the tree.
///
/// The tree is left untouched on error.
pub fn take_frontmatter(root: &mut Node) -> Result<PostMetadata, FrontmatterError> {
    let metadata = extract_frontmatter(root)?;
    if let Some(children) = root.children_mut() {
        children.remove(0);
    }
    Ok(metadata)
}

/// Decodes a raw YAML block into [`PostMetadata`].
pub fn parse_metadata(block: &str) -> Result<PostMetadata, FrontmatterError> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;

    match value {
        serde_yaml::Value::Mapping(_) => serde_yaml::from_value(value)
            .map_err(|err| FrontmatterError::Parse(err.to_string())),
        serde_yaml::Value::Null => Err(FrontmatterError::Parse(
            "empty frontmatter block".to_string(),
        )),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}
