//! Concurrent asset download engine for streaming rendered icons to disk.
//!
//! # Features
//!
//! - Streaming downloads through the [`AssetFetcher`] seam
//! - Semaphore-bounded concurrency
//! - Retry budget per asset with optional exponential backoff
//! - Append-only [`ErrorLog`] of assets that exhausted their budget
//!
//! # Example
//!
//! ```no_run
//! use figma_icons_core::download::{AssetFetcher, HttpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let _stream = client.fetch_stream("https://example.com/icon.svg").await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod engine;
mod error;
mod error_log;
mod fetcher;
mod retry;

pub use client::HttpClient;
pub use engine::{
    DEFAULT_CONCURRENCY, DownloadBatch, DownloadEngine, DownloadOutcome, DownloadStats,
    DownloadTarget, EngineError, Outcome,
};
pub use error::DownloadError;
pub use error_log::ErrorLog;
pub use fetcher::{AssetFetcher, AssetStream};
pub use retry::{DEFAULT_MAX_RETRIES, RetryDecision, RetryPolicy};
