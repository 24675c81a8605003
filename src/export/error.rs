//! Fatal errors that abort an export run.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::download::EngineError;
use crate::figma::ApiError;

/// Errors that stop an export run.
///
/// Per-file download failures are not represented here; they are retried,
/// logged and reported without aborting the run.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The document tree could not be fetched.
    #[error("failed to fetch document {file_id}: {source}")]
    TreeFetch {
        /// Figma file key.
        file_id: String,
        /// Underlying API error.
        #[source]
        source: ApiError,
    },

    /// A selected page does not exist in the document.
    #[error("page \"{page}\" not found (available pages: {})", available.join(", "))]
    PageNotFound {
        /// Requested page name.
        page: String,
        /// Pages present in the document.
        available: Vec<String>,
    },

    /// The selected pages contain no components or instances.
    #[error("no icons found on page(s): {}", pages.join(", "))]
    NoIcons {
        /// Pages that were searched.
        pages: Vec<String>,
    },

    /// A URL resolution request failed.
    #[error("failed to resolve image URLs for chunk {chunk}: {source}")]
    Resolution {
        /// Zero-based chunk index.
        chunk: usize,
        /// Underlying API error.
        #[source]
        source: ApiError,
    },

    /// The destination directory could not be prepared.
    #[error("cannot prepare output directory {path}: {source}")]
    Io {
        /// Directory path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The download engine could not be built or run.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ExportError {
    /// Creates a tree fetch error.
    pub fn tree_fetch(file_id: impl Into<String>, source: ApiError) -> Self {
        Self::TreeFetch {
            file_id: file_id.into(),
            source,
        }
    }

    /// Creates an output directory error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
