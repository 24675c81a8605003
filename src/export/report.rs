//! Human-readable summary of a finished export.

use std::fmt;
use std::path::PathBuf;

use crate::download::{DownloadOutcome, Outcome};

use super::DUPLICATE_MARKER;

const DUPLICATE_FLAG: &str = "!";

/// One successfully written file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// File name, prefixed with the page directory in multi-page runs.
    pub file_name: String,
    /// On-disk size in bytes.
    pub size_bytes: u64,
    /// Whether the name carries the duplicate marker.
    pub duplicate: bool,
}

/// Download summary table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    rows: Vec<ReportRow>,
    failed: usize,
    skipped: usize,
    error_log: Option<PathBuf>,
}

impl Report {
    /// Creates an empty report pointing at the error log.
    #[must_use]
    pub fn new(error_log: impl Into<PathBuf>) -> Self {
        Self {
            error_log: Some(error_log.into()),
            ..Self::default()
        }
    }

    /// Summarizes one batch of outcomes.
    #[must_use]
    pub fn summarize(outcomes: &[DownloadOutcome]) -> Self {
        let mut report = Self::default();
        report.add_outcomes(None, outcomes);
        report
    }

    /// Adds a batch; `page_dir` prefixes row names in multi-page runs.
    pub fn add_outcomes(&mut self, page_dir: Option<&str>, outcomes: &[DownloadOutcome]) {
        for outcome in outcomes {
            match outcome.outcome {
                Outcome::Succeeded { size } => {
                    let file_name = outcome.target.file_name();
                    self.rows.push(ReportRow {
                        file_name: match page_dir {
                            Some(page) => format!("{page}/{file_name}"),
                            None => file_name,
                        },
                        size_bytes: size,
                        duplicate: outcome.target.name.contains(DUPLICATE_MARKER),
                    });
                }
                Outcome::FailedExhausted { .. } => self.failed += 1,
            }
        }
    }

    /// Counts icons dropped because they had no render URL.
    pub fn add_skipped(&mut self, count: usize) {
        self.skipped += count;
    }

    /// Rows for written files, in download order.
    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Number of files that exhausted their retries.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Number of icons skipped for lack of a render URL.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Total bytes written.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.rows.iter().map(|row| row.size_bytes).sum()
    }

    fn has_duplicates(&self) -> bool {
        self.rows.iter().any(|row| row.duplicate)
    }
}

/// Formats a byte count as KiB with two decimals.
///
/// ```
/// use figma_icons_core::export::format_size;
///
/// assert_eq!(format_size(1536), "1.50 KiB");
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let kib = bytes as f64 / 1024.0;
    format!("{kib:.2} KiB")
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                if row.duplicate {
                    format!("{DUPLICATE_FLAG} {}", row.file_name)
                } else {
                    row.file_name.clone()
                }
            })
            .collect();
        let width = names
            .iter()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0)
            .max("File".len());

        writeln!(f, "{:<width$}  Size", "File")?;
        for (name, row) in names.iter().zip(&self.rows) {
            writeln!(f, "{name:<width$}  {}", format_size(row.size_bytes))?;
        }

        writeln!(
            f,
            "{} file(s), {} total",
            self.rows.len(),
            format_size(self.total_bytes())
        )?;
        if self.has_duplicates() {
            writeln!(
                f,
                "{DUPLICATE_FLAG} renamed with \"{DUPLICATE_MARKER}\" to avoid a name collision"
            )?;
        }
        if self.skipped > 0 {
            writeln!(f, "{} icon(s) had no render URL and were skipped", self.skipped)?;
        }
        if self.failed > 0 {
            match &self.error_log {
                Some(path) => writeln!(
                    f,
                    "{} download(s) failed, see {}",
                    self.failed,
                    path.display()
                )?,
                None => writeln!(f, "{} download(s) failed", self.failed)?,
            }
        }
        Ok(())
    }
}
