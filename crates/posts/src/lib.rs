#![deny(missing_docs)]
//! mdpost posts: loading, rendering, and listing posts stored on disk.

/// Store error types.
pub mod error;
/// Post summaries and date ordering.
pub mod listing;
/// Directory-backed post storage.
pub mod store;

pub use error::StoreError;
pub use listing::{PostSummary, parse_post_date, sort_newest_first};
pub use store::{POST_FILE_NAME, Post, PostStore};
