use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Document the location points into, when known
    pub document: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            document: None,
            line,
            column,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(document) = &self.document {
            write!(f, "{}:{}:{}", document, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Errors that can occur while turning a markdown post into a tree.
#[derive(Debug, Error)]
pub enum MdpostError {
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    MarkdownAdapter {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// UTF-8 encoding error in the post source.
    #[error("Encoding error: {0}")]
    EncodingError(#[from] std::string::FromUtf8Error),
}

impl MdpostError {
    /// Tags a parse error's location with the document it came from.
    ///
    /// Other errors are returned unchanged.
    pub fn in_document(mut self, document: &str) -> Self {
        if let Self::MarkdownAdapter { location, .. } = &mut self {
            location.document = Some(document.to_string());
        }
        self
    }
}
