//! Byte-stream fetch seam used by the download engine.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

use super::DownloadError;

/// Boxed body stream returned by an [`AssetFetcher`].
pub type AssetStream = BoxStream<'static, Result<Bytes, DownloadError>>;

/// Opens a byte stream for a resolved asset URL.
///
/// [`HttpClient`](super::HttpClient) is the production implementation; tests
/// plug in in-memory storage.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Starts fetching `url`; errors before the first byte are returned here,
    /// mid-stream errors surface as stream items.
    async fn fetch_stream(&self, url: &str) -> Result<AssetStream, DownloadError>;
}
