//! Append-only log of downloads that exhausted their retry budget.
//!
//! One line per failure: `<ISO-8601 timestamp> - <raw name>: <error message>`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// Shared error log file.
///
/// Appends from concurrent download tasks are serialized and each one writes
/// a complete newline-terminated line.
#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ErrorLog {
    /// Creates a handle; the file is created on first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Log file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Formats one log line, including the trailing newline.
    ///
    /// Newlines inside the name or message are flattened to spaces.
    #[must_use]
    pub fn format_line(timestamp: DateTime<Utc>, raw_name: &str, message: &str) -> String {
        format!(
            "{} - {}: {}\n",
            timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            single_line(raw_name),
            single_line(message)
        )
    }

    /// Appends a failure stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns the IO error if the file cannot be opened or written.
    pub async fn append(&self, raw_name: &str, message: &str) -> std::io::Result<()> {
        let line = Self::format_line(Utc::now(), raw_name, message);

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        debug!(path = %self.path.display(), "appended error log entry");
        Ok(())
    }
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}
