//! Design document model and the API used to fetch it.
//!
//! - [`DesignApi`] - Async trait for document fetch and image URL resolution
//! - [`FigmaClient`] - REST implementation against the Figma API
//! - [`DocumentNode`] - Read-only view over the remote node tree
//!
//! The export pipeline only talks to [`DesignApi`], so tests can substitute
//! an in-memory document.

mod client;
mod document;
mod error;

pub use client::FigmaClient;
pub use document::{DocumentNode, NodeType};
pub use error::ApiError;

use std::collections::HashMap;

use async_trait::async_trait;

/// Render format requested from the image endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFormat {
    /// Scalable vector output.
    #[default]
    Svg,
}

impl ImageFormat {
    /// Query-string value and file extension.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
        }
    }
}

/// Remote design service consumed by the exporter.
///
/// Uses `async_trait` so the exporter can hold an `Arc<dyn DesignApi>`.
#[async_trait]
pub trait DesignApi: Send + Sync {
    /// Fetches the full document tree for a file.
    async fn fetch_document_tree(&self, file_id: &str) -> Result<DocumentNode, ApiError>;

    /// Resolves render URLs for node ids.
    ///
    /// A `None` value (or an absent key) means the node could not be rendered.
    async fn resolve_image_urls(
        &self,
        file_id: &str,
        ids: &[String],
        format: ImageFormat,
    ) -> Result<HashMap<String, Option<String>>, ApiError>;
}
