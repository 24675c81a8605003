//! Per-run export context.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use super::error::ExportError;
use super::progress::ExportProgress;
use crate::config::{ConfigError, DuplicatePolicy, ExportConfig, PageSelection};
use crate::download::{AssetFetcher, ErrorLog, HttpClient, RetryPolicy};
use crate::figma::{DesignApi, FigmaClient};

/// Everything one export run needs, built once and passed explicitly.
pub struct ExportContext {
    /// Figma file key.
    pub file_id: String,
    /// Destination root.
    pub icons_path: PathBuf,
    /// Pages to export and output layout.
    pub selection: PageSelection,
    /// Document and render URL service.
    pub api: Arc<dyn DesignApi>,
    /// Asset byte source.
    pub fetcher: Arc<dyn AssetFetcher>,
    /// Exhausted download log.
    pub error_log: Arc<ErrorLog>,
    /// Icons per URL resolution request.
    pub chunk_size: usize,
    /// Maximum concurrent downloads.
    pub concurrency: usize,
    /// Per-download retry budget.
    pub retry_policy: RetryPolicy,
    /// Which colliding icon gets renamed.
    pub duplicate_policy: DuplicatePolicy,
    /// Wipe the destination root first.
    pub clean: bool,
    /// Live progress for console display.
    pub progress: Arc<ExportProgress>,
}

impl std::fmt::Debug for ExportContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportContext")
            .field("file_id", &self.file_id)
            .field("icons_path", &self.icons_path)
            .field("selection", &self.selection)
            .field("chunk_size", &self.chunk_size)
            .field("concurrency", &self.concurrency)
            .field("retry_policy", &self.retry_policy)
            .field("duplicate_policy", &self.duplicate_policy)
            .field("clean", &self.clean)
            .finish_non_exhaustive()
    }
}

impl ExportContext {
    /// Builds a context talking to the real Figma API and asset storage.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Config`] for invalid configuration and
    /// [`ExportError::TreeFetch`] if the API client cannot be built.
    pub fn from_config(config: &ExportConfig) -> Result<Self, ExportError> {
        config.validate()?;
        let file_id = required(config.file_id.as_deref(), "fileId")?;
        let token = required(config.figma_personal_token.as_deref(), "figmaPersonalToken")?;
        let api = FigmaClient::new(config.api_base_url(), token)
            .map_err(|source| ExportError::tree_fetch(file_id, source))?;
        Self::with_backends(config, Arc::new(api), Arc::new(HttpClient::new()))
    }

    /// Builds a context around caller-supplied backends.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Config`] for invalid configuration.
    pub fn with_backends(
        config: &ExportConfig,
        api: Arc<dyn DesignApi>,
        fetcher: Arc<dyn AssetFetcher>,
    ) -> Result<Self, ExportError> {
        config.validate()?;
        let selection = config.page_selection()?;
        let file_id = required(config.file_id.as_deref(), "fileId")?.to_string();
        let icons_path = config
            .icons_path
            .clone()
            .ok_or(ConfigError::Missing { field: "iconsPath" })?;

        debug!(
            file_id = %file_id,
            icons_path = %icons_path.display(),
            pages = ?selection.pages(),
            "built export context"
        );

        Ok(Self {
            file_id,
            icons_path,
            selection,
            api,
            fetcher,
            error_log: Arc::new(ErrorLog::new(config.error_log_path())),
            chunk_size: config.chunk_size(),
            concurrency: config.concurrency(),
            retry_policy: RetryPolicy::new(config.max_retries(), config.retry_delay()),
            duplicate_policy: config.duplicate_policy(),
            clean: config.clean(),
            progress: Arc::new(ExportProgress::new()),
        })
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ConfigError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing { field })
}
