use mdpost_core::MdpostError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading posts from storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No post exists under the requested id.
    #[error("Post not found: {id}")]
    NotFound {
        /// The id as requested, before sanitizing.
        id: String,
    },
    /// Any other I/O failure.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The post could not be decoded or parsed.
    #[error(transparent)]
    Render(#[from] MdpostError),
}

impl StoreError {
    /// True for the "not found" condition callers map to a 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub(crate) fn from_io(id: &str, path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound { id: id.to_string() }
        } else {
            StoreError::Io { path, source }
        }
    }
}
