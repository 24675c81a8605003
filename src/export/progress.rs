//! Shared run progress polled by the console spinner.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::download::DownloadStats;

/// Stage an export run is in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Not started.
    #[default]
    Idle,
    /// Fetching the document tree.
    FetchingDocument,
    /// Resolving render URLs for a page.
    ResolvingUrls {
        /// Page name.
        page: String,
    },
    /// Downloading a page's icons.
    Downloading {
        /// Page name.
        page: String,
    },
    /// Run finished.
    Done,
}

/// Progress shared between an export run and whoever displays it.
#[derive(Debug, Default)]
pub struct ExportProgress {
    phase: Mutex<Phase>,
    queued: AtomicUsize,
    downloads: Arc<DownloadStats>,
}

impl ExportProgress {
    /// Creates an idle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
            .lock()
            .map(|phase| phase.clone())
            .unwrap_or_default()
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        if let Ok(mut current) = self.phase.lock() {
            *current = phase;
        }
    }

    pub(crate) fn add_queued(&self, count: usize) {
        self.queued.fetch_add(count, Ordering::SeqCst);
    }

    /// Download counters, updated live by the engine.
    #[must_use]
    pub fn downloads(&self) -> Arc<DownloadStats> {
        Arc::clone(&self.downloads)
    }

    /// One-line status suitable for a spinner.
    #[must_use]
    pub fn message(&self) -> String {
        match self.phase() {
            Phase::Idle => "Starting...".to_string(),
            Phase::FetchingDocument => "Fetching document...".to_string(),
            Phase::ResolvingUrls { page } => format!("Resolving icon URLs for {page}..."),
            Phase::Downloading { page } => format!(
                "[{}/{}] Downloading icons for {page}...",
                self.downloads.total(),
                self.queued.load(Ordering::SeqCst)
            ),
            Phase::Done => "Done".to_string(),
        }
    }
}
