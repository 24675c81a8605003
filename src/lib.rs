//! Figma Icons Core Library
//!
//! This library exports vector icons from a remote Figma document into a
//! local directory tree: it walks the document's pages, frames and
//! components, resolves SVG render URLs in bounded batches, and streams the
//! assets to disk with per-file retries.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - JSON configuration file and page selection
//! - [`figma`] - Document model and the REST client for the design API
//! - [`export`] - Tree extraction, naming, URL batching, reporting and the run pipeline
//! - [`download`] - Concurrent asset download engine with retry and error log

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod export;
pub mod figma;
mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, DuplicatePolicy, ExportConfig, Library, PageSelection};
pub use download::{
    AssetFetcher, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DownloadBatch, DownloadEngine,
    DownloadError, DownloadOutcome, DownloadTarget, EngineError, ErrorLog, HttpClient, Outcome,
    RetryPolicy,
};
pub use export::{
    DEFAULT_CHUNK_SIZE, DUPLICATE_MARKER, ExportContext, ExportError, ExportSummary, Exporter,
    IconDescriptor, Report, extract_icons, find_page, resolve_duplicates, resolve_urls, sanitize,
};
pub use figma::{ApiError, DesignApi, DocumentNode, FigmaClient, ImageFormat, NodeType};
