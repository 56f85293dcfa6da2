//! Filesystem-backed post storage.
//!
//! Each post is a directory under the store root holding an `index.md` plus
//! any assets it references. The directory name is the post slug.

use crate::error::StoreError;
use crate::listing::{PostSummary, sort_newest_first};
use mdpost_core::{PostMetadata, sanitize_document_id};
use mdpost_render::{DocumentContext, Pipeline, RenderedPost};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the markdown source inside a post directory.
pub const POST_FILE_NAME: &str = "index.md";

/// A fully rendered post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Sanitized id the post was loaded under.
    pub slug: String,
    /// Front matter, or the placeholder record.
    pub metadata: PostMetadata,
    /// Rendered HTML body.
    pub content: String,
}

impl Post {
    fn from_rendered(slug: String, rendered: RenderedPost) -> Self {
        Self {
            slug,
            metadata: rendered.metadata,
            content: rendered.content,
        }
    }
}

/// Posts stored as `<root>/<slug>/index.md`.
pub struct PostStore {
    root: PathBuf,
    pipeline: Pipeline,
}

impl PostStore {
    /// Creates a store rendering posts under `root` with `pipeline`.
    pub fn new(root: impl Into<PathBuf>, pipeline: Pipeline) -> Self {
        Self {
            root: root.into(),
            pipeline,
        }
    }

    /// The directory posts are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The pipeline used to render posts.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Source path for a request id, after sanitizing.
    ///
    /// Returns `None` when nothing of the id survives sanitizing.
    pub fn post_path(&self, id: &str) -> Option<(String, PathBuf)> {
        let slug = sanitize_document_id(id);
        if slug.is_empty() {
            return None;
        }
        let path = self.root.join(&slug).join(POST_FILE_NAME);
        Some((slug, path))
    }

    /// Reads and renders a post.
    ///
    /// The id is sanitized first, so path separators and dots can never
    /// leave the store root. A missing post is [`StoreError::NotFound`].
    pub fn read_post(&self, id: &str) -> Result<Post, StoreError> {
        let (slug, path) = self
            .post_path(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        let bytes = fs::read(&path).map_err(|err| StoreError::from_io(id, path, err))?;

        log::debug!("Rendering post {slug}");
        let rendered = self
            .pipeline
            .render_bytes(bytes, &DocumentContext::new(slug.as_str()))?;
        Ok(Post::from_rendered(slug, rendered))
    }

    /// Renders several posts in parallel. Results keep the order of `ids`.
    pub fn read_posts(&self, ids: &[&str]) -> Vec<Result<Post, StoreError>> {
        ids.par_iter().map(|id| self.read_post(id)).collect()
    }

    /// Names of all post directories, sorted.
    pub fn post_ids(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;
            let is_dir = entry
                .file_type()
                .map(|file_type| file_type.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => ids.push(name),
                Err(name) => log::warn!("Skipping non UTF-8 post directory {name:?}"),
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Summaries of every post, newest first.
    ///
    /// Only front matter is decoded. Directories without an `index.md`, or
    /// whose name would not survive id sanitizing, are skipped; any other
    /// read failure aborts the listing.
    pub fn list(&self) -> Result<Vec<PostSummary>, StoreError> {
        let ids = self.post_ids()?;

        let loaded: Vec<Result<Option<PostSummary>, StoreError>> = ids
            .into_par_iter()
            .map(|slug| self.summarize(slug))
            .collect();

        let mut summaries = Vec::with_capacity(loaded.len());
        for summary in loaded {
            if let Some(summary) = summary? {
                summaries.push(summary);
            }
        }
        sort_newest_first(&mut summaries);
        Ok(summaries)
    }

    fn summarize(&self, slug: String) -> Result<Option<PostSummary>, StoreError> {
        if sanitize_document_id(&slug) != slug {
            log::warn!("Skipping post directory {slug:?}: not a valid post id");
            return Ok(None);
        }
        let path = self.root.join(&slug).join(POST_FILE_NAME);
        let source = match fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes).map_err(mdpost_core::MdpostError::from)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Skipping {}: no {POST_FILE_NAME}", path.display());
                return Ok(None);
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let metadata = self.pipeline.read_metadata(&source)?;
        Ok(Some(PostSummary { slug, metadata }))
    }
}
