//! Download engine for concurrent asset downloads with retry support.
//!
//! The `DownloadEngine` streams every [`DownloadTarget`] of a batch to disk
//! through an [`AssetFetcher`], bounded by a semaphore, retrying each target
//! until its budget is spent. Exhausted targets are appended to the
//! [`ErrorLog`] and never fail the batch.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use figma_icons_core::download::{
//!     DownloadEngine, DownloadTarget, ErrorLog, HttpClient, RetryPolicy,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = DownloadEngine::new(10, RetryPolicy::default())?;
//! let targets = vec![DownloadTarget::new(
//!     "Name=arrow-up",
//!     "arrow-up",
//!     "https://example.com/arrow-up.svg",
//!     PathBuf::from("./icons/arrows"),
//! )];
//! let log = Arc::new(ErrorLog::new("download-errors.log"));
//! let batch = engine
//!     .download_all(targets, Arc::new(HttpClient::new()), log)
//!     .await?;
//! println!("Completed: {}, Failed: {}", batch.stats.completed(), batch.stats.failed());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::constants::DEFAULT_EXTENSION;
use super::error_log::ErrorLog;
use super::fetcher::{AssetFetcher, AssetStream};
use super::retry::{RetryDecision, RetryPolicy};
use super::DownloadError;

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 100;

/// Default concurrency if not specified.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Error type for download engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// One asset to fetch and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Node label as it appears in the design file (used in the error log).
    pub raw_name: String,
    /// Resolved file stem.
    pub name: String,
    /// Render URL.
    pub url: String,
    /// Destination directory (created on demand).
    pub directory: PathBuf,
    /// File extension without the dot.
    pub extension: String,
}

impl DownloadTarget {
    /// Creates an SVG target.
    #[must_use]
    pub fn new(
        raw_name: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            raw_name: raw_name.into(),
            name: name.into(),
            url: url.into(),
            directory: directory.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Output file name, `<name>.<extension>`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }

    /// Full output path.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.directory.join(self.file_name())
    }
}

/// Terminal state of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Written; `size` is the on-disk byte size read back after the write.
    Succeeded {
        /// File size in bytes.
        size: u64,
    },
    /// Every attempt failed; the last error is kept.
    FailedExhausted {
        /// Last error message.
        error: String,
        /// Attempts made.
        attempts: u32,
    },
}

/// Per-target result, in the order targets were submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// The target this outcome belongs to.
    pub target: DownloadTarget,
    /// What happened.
    pub outcome: Outcome,
}

impl DownloadOutcome {
    /// Size in bytes when the download succeeded.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        match self.outcome {
            Outcome::Succeeded { size } => Some(size),
            Outcome::FailedExhausted { .. } => None,
        }
    }

    /// Whether the download succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded { .. })
    }
}

/// Statistics from a download batch run.
///
/// Uses atomic counters for thread-safe updates from concurrent download tasks.
#[derive(Debug, Default)]
pub struct DownloadStats {
    completed: AtomicUsize,
    failed: AtomicUsize,
    retried: AtomicUsize,
}

impl DownloadStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of successfully completed downloads.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Returns the number of failed downloads.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Returns the total number of items processed (completed + failed).
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed() + self.failed()
    }

    /// Returns the number of retry attempts made.
    #[must_use]
    pub fn retried(&self) -> usize {
        self.retried.load(Ordering::SeqCst)
    }

    fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_retried(&self) {
        self.retried.fetch_add(1, Ordering::SeqCst);
    }

    fn snapshot(&self) -> Self {
        Self {
            completed: AtomicUsize::new(self.completed()),
            failed: AtomicUsize::new(self.failed()),
            retried: AtomicUsize::new(self.retried()),
        }
    }
}

/// Outcomes and counters of one [`DownloadEngine::download_all`] call.
#[derive(Debug)]
pub struct DownloadBatch {
    /// One outcome per target, in submission order.
    pub outcomes: Vec<DownloadOutcome>,
    /// Aggregate counters.
    pub stats: DownloadStats,
}

/// Download engine for concurrent asset downloads with retry support.
///
/// # Concurrency Model
///
/// - Each download runs in its own Tokio task
/// - A semaphore permit is acquired before starting each download
/// - Permits are released automatically when downloads complete (RAII)
///
/// # Retry Behavior
///
/// - Any failure is retried until the policy's budget is spent
/// - Exhausted targets get one error log line and a `FailedExhausted` outcome
#[derive(Debug)]
pub struct DownloadEngine {
    semaphore: Arc<Semaphore>,
    concurrency: usize,
    retry_policy: RetryPolicy,
}

impl DownloadEngine {
    /// Creates a new download engine with the specified concurrency limit and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-100).
    ///
    /// # Example
    ///
    /// ```
    /// use figma_icons_core::download::{DownloadEngine, RetryPolicy};
    ///
    /// let engine = DownloadEngine::new(10, RetryPolicy::default()).unwrap();
    /// assert_eq!(engine.concurrency(), 10);
    /// ```
    #[instrument(level = "debug", skip(retry_policy))]
    pub fn new(concurrency: usize, retry_policy: RetryPolicy) -> Result<Self, EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(EngineError::InvalidConcurrency { value: concurrency });
        }

        debug!(
            concurrency,
            max_retries = retry_policy.max_retries(),
            "creating download engine"
        );

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            retry_policy,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Downloads every target concurrently.
    ///
    /// Individual download failures do NOT cause this method to error; they
    /// are logged to `error_log` and reported as
    /// [`Outcome::FailedExhausted`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if the semaphore is closed.
    pub async fn download_all(
        &self,
        targets: Vec<DownloadTarget>,
        fetcher: Arc<dyn AssetFetcher>,
        error_log: Arc<ErrorLog>,
    ) -> Result<DownloadBatch, EngineError> {
        self.download_all_tracked(targets, fetcher, error_log, Arc::new(DownloadStats::new()))
            .await
    }

    /// Like [`download_all`](Self::download_all), counting into `stats` as
    /// downloads finish so another task can watch progress.
    ///
    /// The returned batch's stats are a snapshot of `stats`, so they include
    /// anything counted before this call.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if the semaphore is closed.
    #[instrument(skip_all, fields(targets = targets.len()))]
    pub async fn download_all_tracked(
        &self,
        targets: Vec<DownloadTarget>,
        fetcher: Arc<dyn AssetFetcher>,
        error_log: Arc<ErrorLog>,
        stats: Arc<DownloadStats>,
    ) -> Result<DownloadBatch, EngineError> {
        let mut handles = Vec::with_capacity(targets.len());

        info!(concurrency = self.concurrency, "starting downloads");

        for target in targets {
            // Blocks while the pool is full
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;

            let fetcher = Arc::clone(&fetcher);
            let error_log = Arc::clone(&error_log);
            let stats_for_task = Arc::clone(&stats);
            let policy = self.retry_policy.clone();
            let fallback = target.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let outcome =
                    match download_with_retry(fetcher.as_ref(), &target, &policy, &stats_for_task)
                        .await
                    {
                        Ok(size) => {
                            info!(name = %target.name, size, "download completed");
                            stats_for_task.increment_completed();
                            Outcome::Succeeded { size }
                        }
                        Err((error, attempts)) => {
                            warn!(
                                name = %target.raw_name,
                                url = %target.url,
                                error = %error,
                                attempts,
                                "download failed after all attempts"
                            );
                            let message = error.to_string();
                            if let Err(log_error) =
                                error_log.append(&target.raw_name, &message).await
                            {
                                warn!(
                                    path = %error_log.path().display(),
                                    error = %log_error,
                                    "failed to append to error log"
                                );
                            }
                            stats_for_task.increment_failed();
                            Outcome::FailedExhausted {
                                error: message,
                                attempts,
                            }
                        }
                    };
                DownloadOutcome { target, outcome }
            });
            handles.push((fallback, handle));
        }

        debug!(task_count = handles.len(), "waiting for downloads to complete");

        let mut outcomes = Vec::with_capacity(handles.len());
        for (target, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    warn!(name = %target.name, error = %e, "download task panicked");
                    stats.increment_failed();
                    outcomes.push(DownloadOutcome {
                        target,
                        outcome: Outcome::FailedExhausted {
                            error: format!("download task panicked: {e}"),
                            attempts: 0,
                        },
                    });
                }
            }
        }

        info!(
            completed = stats.completed(),
            failed = stats.failed(),
            retried = stats.retried(),
            "downloads complete"
        );

        Ok(DownloadBatch {
            outcomes,
            stats: stats.snapshot(),
        })
    }
}

/// Downloads one target, retrying until the policy gives up.
///
/// # Returns
///
/// - `Ok(u64)` - On-disk size of the written file
/// - `Err((DownloadError, u32))` - Last error and total attempt count
#[instrument(skip(fetcher, target, policy, stats), fields(name = %target.name, url = %target.url))]
async fn download_with_retry(
    fetcher: &dyn AssetFetcher,
    target: &DownloadTarget,
    policy: &RetryPolicy,
    stats: &DownloadStats,
) -> Result<u64, (DownloadError, u32)> {
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        debug!(attempt, "attempting download");

        match download_once(fetcher, target).await {
            Ok(size) => return Ok(size),
            Err(e) => match policy.should_retry(attempt) {
                RetryDecision::Retry {
                    delay,
                    attempt: next_attempt,
                } => {
                    info!(
                        name = %target.raw_name,
                        attempt = next_attempt,
                        max_attempts = policy.max_attempts(),
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "retrying download"
                    );
                    stats.increment_retried();
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(%reason, "not retrying download");
                    return Err((e, attempt));
                }
            },
        }
    }
}

async fn download_once(fetcher: &dyn AssetFetcher, target: &DownloadTarget) -> Result<u64, DownloadError> {
    // create_dir_all tolerates a concurrent task creating the same directory
    tokio::fs::create_dir_all(&target.directory)
        .await
        .map_err(|e| DownloadError::io(target.directory.clone(), e))?;

    let file_path = target.path();
    let stream = fetcher.fetch_stream(&target.url).await?;

    let file = File::create(&file_path)
        .await
        .map_err(|e| DownloadError::io(file_path.clone(), e))?;

    let stream_result = stream_to_file(file, stream, &file_path).await;
    if stream_result.is_err() {
        debug!(path = %file_path.display(), "cleaning up partial file after error");
        let _ = tokio::fs::remove_file(&file_path).await;
    }
    let bytes_written = stream_result?;

    let size = tokio::fs::metadata(&file_path)
        .await
        .map_err(|e| DownloadError::io(file_path.clone(), e))?
        .len();
    debug!(path = %file_path.display(), bytes_written, size, "file written");
    Ok(size)
}

async fn stream_to_file(
    file: File,
    mut stream: AssetStream,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_new_valid_concurrency() {
        let engine = DownloadEngine::new(1, RetryPolicy::default()).unwrap();
        assert_eq!(engine.concurrency(), 1);

        let engine = DownloadEngine::new(100, RetryPolicy::default()).unwrap();
        assert_eq!(engine.concurrency(), 100);
    }

    #[test]
    fn test_engine_new_invalid_concurrency_zero() {
        let result = DownloadEngine::new(0, RetryPolicy::default());
        assert!(matches!(
            result,
            Err(EngineError::InvalidConcurrency { value: 0 })
        ));
    }

    #[test]
    fn test_engine_new_invalid_concurrency_too_high() {
        let result = DownloadEngine::new(101, RetryPolicy::default());
        assert!(matches!(
            result,
            Err(EngineError::InvalidConcurrency { value: 101 })
        ));
    }

    #[test]
    fn test_engine_stores_retry_policy() {
        let engine = DownloadEngine::new(10, RetryPolicy::with_max_retries(5)).unwrap();
        assert_eq!(engine.retry_policy().max_retries(), 5);
    }

    #[test]
    fn test_target_path_uses_svg_extension() {
        let target = DownloadTarget::new("Name=Up", "up", "https://x/up", "/out/arrows");
        assert_eq!(target.file_name(), "up.svg");
        assert_eq!(target.path(), PathBuf::from("/out/arrows/up.svg"));
    }

    #[test]
    fn test_download_stats_increment() {
        let stats = DownloadStats::new();
        stats.increment_completed();
        stats.increment_completed();
        stats.increment_failed();
        stats.increment_retried();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.completed(), 2);
        assert_eq!(snapshot.failed(), 1);
        assert_eq!(snapshot.retried(), 1);
        assert_eq!(snapshot.total(), 3);
    }

    #[test]
    fn test_outcome_size_only_on_success() {
        let target = DownloadTarget::new("a", "a", "https://x/a", "/out");
        let ok = DownloadOutcome {
            target: target.clone(),
            outcome: Outcome::Succeeded { size: 42 },
        };
        let failed = DownloadOutcome {
            target,
            outcome: Outcome::FailedExhausted {
                error: "boom".to_string(),
                attempts: 4,
            },
        };
        assert_eq!(ok.size(), Some(42));
        assert!(ok.is_success());
        assert_eq!(failed.size(), None);
        assert!(!failed.is_success());
    }

    #[test]
    fn test_engine_error_display() {
        let msg = EngineError::InvalidConcurrency { value: 0 }.to_string();
        assert!(msg.contains("invalid concurrency"));
        assert!(msg.contains("100"));
    }
}
