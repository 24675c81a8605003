//! Export configuration loaded from the JSON config file.
//!
//! The file keeps the camelCase keys used by existing `icons-config.json`
//! files. Everything beyond the Figma identifiers and destination is an
//! optional tuning knob with a default.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::download::{DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES};
use crate::export::DEFAULT_CHUNK_SIZE;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "icons-config.json";

/// Default error log file name, resolved against the working directory.
pub const DEFAULT_ERROR_LOG: &str = "download-errors.log";

/// Default Figma REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.figma.com/v1";

/// Environment variable consulted when the config file carries no token.
pub const TOKEN_ENV_VAR: &str = "FIGMA_PERSONAL_TOKEN";

const MAX_CONCURRENCY: usize = 100;
const MAX_CHUNK_SIZE: usize = 500;
const MAX_RETRIES: u32 = 10;

/// Errors raised while loading or validating configuration.
///
/// All of these are fatal and surface before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`ExportConfig`].
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A required key is absent or empty.
    #[error("missing required config value `{field}`")]
    Missing {
        /// The camelCase key name.
        field: &'static str,
    },

    /// `library` is set to something other than `icons` or `spots`.
    #[error("invalid library value `{value}`: use \"icons\" or \"spots\"")]
    InvalidLibrary {
        /// The rejected value.
        value: String,
    },

    /// The selected library has no pages listed.
    #[error("no pages configured for library `{library}`")]
    NoPages {
        /// The selected library.
        library: String,
    },

    /// Neither `library` nor `page` was given.
    #[error("no page selection: set \"page\" or \"library\" in the config file")]
    NoPageSelection,

    /// A numeric tuning value is out of range.
    #[error("invalid config value for `{field}`: {value}. Expected range: {min}..={max}")]
    OutOfRange {
        /// The camelCase key name.
        field: &'static str,
        /// The rejected value.
        value: u64,
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
    },
}

/// Which page list a multi-page run draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Library {
    /// `pagesIcons`
    Icons,
    /// `pagesSpots`
    Spots,
}

impl Library {
    /// Parses the `library` config value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLibrary`] for anything but `icons`/`spots`.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "icons" => Ok(Self::Icons),
            "spots" => Ok(Self::Spots),
            other => Err(ConfigError::InvalidLibrary {
                value: other.to_string(),
            }),
        }
    }

    /// Returns the config label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Icons => "icons",
            Self::Spots => "spots",
        }
    }
}

/// Resolved page selection and output layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelection {
    /// One page; files land in `iconsPath/<category>/`.
    Single(String),
    /// Several pages; files land in `iconsPath/<page>/<category>/`.
    Multi {
        /// Library the pages came from.
        library: Library,
        /// Page names in configured order.
        pages: Vec<String>,
    },
}

impl PageSelection {
    /// Page names to export, in order.
    #[must_use]
    pub fn pages(&self) -> Vec<&str> {
        match self {
            Self::Single(page) => vec![page.as_str()],
            Self::Multi { pages, .. } => pages.iter().map(String::as_str).collect(),
        }
    }

    /// Whether output is nested under a per-page directory.
    #[must_use]
    pub fn is_multi_page(&self) -> bool {
        matches!(self, Self::Multi { .. })
    }
}

/// Which occurrence of a colliding name receives the duplicate marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// The previously seen icon is renamed; the newcomer keeps the plain name.
    #[default]
    Earlier,
    /// The newcomer is renamed; the first icon keeps the plain name.
    Later,
}

/// Export configuration as read from `icons-config.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Figma personal access token.
    #[serde(default)]
    pub figma_personal_token: Option<String>,
    /// Figma file key.
    #[serde(default)]
    pub file_id: Option<String>,
    /// Destination root directory.
    #[serde(default)]
    pub icons_path: Option<PathBuf>,
    /// Page name for single-page mode.
    #[serde(default)]
    pub page: Option<String>,
    /// `icons` or `spots`; selects multi-page mode.
    #[serde(default)]
    pub library: Option<String>,
    /// Pages exported when `library` is `icons`.
    #[serde(default)]
    pub pages_icons: Vec<String>,
    /// Pages exported when `library` is `spots`.
    #[serde(default)]
    pub pages_spots: Vec<String>,
    /// Icons per URL resolution request.
    #[serde(default)]
    pub chunk_size: Option<usize>,
    /// Maximum concurrent downloads.
    #[serde(default)]
    pub concurrency: Option<usize>,
    /// Extra attempts after the first failed download.
    #[serde(default)]
    pub max_retries: Option<u32>,
    /// Base delay between download attempts in milliseconds.
    #[serde(default)]
    pub retry_delay_ms: Option<u64>,
    /// Error log path.
    #[serde(default)]
    pub error_log_path: Option<PathBuf>,
    /// Figma API base URL (tests point this at a mock server).
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// Remove the destination root before downloading.
    #[serde(default)]
    pub clean: Option<bool>,
    /// Duplicate rename policy.
    #[serde(default)]
    pub duplicate_policy: Option<DuplicatePolicy>,
}

impl ExportConfig {
    /// Loads and parses a config file.
    ///
    /// When the file has no token, [`TOKEN_ENV_VAR`] is consulted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.figma_personal_token.is_none() {
            config.figma_personal_token = env::var(TOKEN_ENV_VAR).ok();
        }
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Parses config JSON without touching the environment.
    ///
    /// # Errors
    ///
    /// Returns the underlying JSON error.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Resolves which pages to export and how output is laid out.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLibrary`], [`ConfigError::NoPages`] or
    /// [`ConfigError::NoPageSelection`].
    pub fn page_selection(&self) -> Result<PageSelection, ConfigError> {
        if let Some(library) = self.library.as_deref() {
            let library = Library::parse(library)?;
            let pages = match library {
                Library::Icons => &self.pages_icons,
                Library::Spots => &self.pages_spots,
            };
            if pages.is_empty() {
                return Err(ConfigError::NoPages {
                    library: library.as_str().to_string(),
                });
            }
            return Ok(PageSelection::Multi {
                library,
                pages: pages.clone(),
            });
        }

        // Page names are matched verbatim, trailing spaces included.
        match self.page.as_deref() {
            Some(page) if !page.trim().is_empty() => Ok(PageSelection::Single(page.to_string())),
            _ => Err(ConfigError::NoPageSelection),
        }
    }

    /// Validates every value a run depends on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        required("fileId", self.file_id.as_deref())?;
        required("figmaPersonalToken", self.figma_personal_token.as_deref())?;
        if self
            .icons_path
            .as_ref()
            .is_none_or(|p| p.as_os_str().is_empty())
        {
            return Err(ConfigError::Missing { field: "iconsPath" });
        }
        self.page_selection()?;

        in_range("chunkSize", self.chunk_size(), 1, MAX_CHUNK_SIZE)?;
        in_range("concurrency", self.concurrency(), 1, MAX_CONCURRENCY)?;
        in_range(
            "maxRetries",
            self.max_retries() as usize,
            0,
            MAX_RETRIES as usize,
        )?;
        Ok(())
    }

    /// Icons per URL resolution request.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    /// Maximum concurrent downloads.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    /// Extra attempts after a failed download.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    /// Base delay between download attempts (zero retries immediately).
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms.unwrap_or(0))
    }

    /// Whether the destination root is wiped before downloading.
    #[must_use]
    pub fn clean(&self) -> bool {
        self.clean.unwrap_or(false)
    }

    /// Error log path.
    #[must_use]
    pub fn error_log_path(&self) -> PathBuf {
        self.error_log_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ERROR_LOG))
    }

    /// Figma API base URL.
    #[must_use]
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Duplicate rename policy.
    #[must_use]
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy.unwrap_or_default()
    }
}

fn required(field: &'static str, value: Option<&str>) -> Result<(), ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(ConfigError::Missing { field }),
    }
}

fn in_range(field: &'static str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        return Ok(());
    }
    Err(ConfigError::OutOfRange {
        field,
        value: value as u64,
        min: min as u64,
        max: max as u64,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base_json(extra: &str) -> String {
        format!(
            r#"{{
                "figmaPersonalToken": "token",
                "fileId": "abc123",
                "iconsPath": "assets/icons"{extra}
            }}"#
        )
    }

    #[test]
    fn test_single_page_selection() {
        let config = ExportConfig::from_json(&base_json(r#", "page": "Icons""#)).unwrap();
        assert_eq!(
            config.page_selection().unwrap(),
            PageSelection::Single("Icons".to_string())
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_single_page_name_kept_verbatim() {
        let config = ExportConfig::from_json(&base_json(r#", "page": "Icons ""#)).unwrap();
        assert_eq!(
            config.page_selection().unwrap(),
            PageSelection::Single("Icons ".to_string())
        );
    }

    #[test]
    fn test_blank_single_page_rejected() {
        let config = ExportConfig::from_json(&base_json(r#", "page": "   ""#)).unwrap();
        assert!(matches!(
            config.page_selection(),
            Err(ConfigError::NoPageSelection)
        ));
    }

    #[test]
    fn test_library_selects_multi_page() {
        let config = ExportConfig::from_json(&base_json(
            r#", "library": "spots", "pagesIcons": ["A"], "pagesSpots": ["S1", "S2"]"#,
        ))
        .unwrap();
        let selection = config.page_selection().unwrap();
        assert!(selection.is_multi_page());
        assert_eq!(selection.pages(), vec!["S1", "S2"]);
    }

    #[test]
    fn test_library_takes_precedence_over_page() {
        let config = ExportConfig::from_json(&base_json(
            r#", "page": "Single", "library": "icons", "pagesIcons": ["A"]"#,
        ))
        .unwrap();
        assert_eq!(config.page_selection().unwrap().pages(), vec!["A"]);
    }

    #[test]
    fn test_invalid_library_rejected() {
        let config = ExportConfig::from_json(&base_json(r#", "library": "fonts""#)).unwrap();
        assert!(matches!(
            config.page_selection(),
            Err(ConfigError::InvalidLibrary { value }) if value == "fonts"
        ));
    }

    #[test]
    fn test_library_without_pages_rejected() {
        let config = ExportConfig::from_json(&base_json(r#", "library": "icons""#)).unwrap();
        assert!(matches!(
            config.page_selection(),
            Err(ConfigError::NoPages { .. })
        ));
    }

    #[test]
    fn test_missing_page_selection_rejected() {
        let config = ExportConfig::from_json(&base_json("")).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoPageSelection)
        ));
    }

    #[test]
    fn test_missing_file_id_rejected() {
        let config =
            ExportConfig::from_json(r#"{"figmaPersonalToken": "t", "iconsPath": "x", "page": "P"}"#)
                .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing { field: "fileId" })
        ));
    }

    #[test]
    fn test_defaults_applied() {
        let config = ExportConfig::from_json(&base_json(r#", "page": "Icons""#)).unwrap();
        assert_eq!(config.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(config.concurrency(), DEFAULT_CONCURRENCY);
        assert_eq!(config.max_retries(), DEFAULT_MAX_RETRIES);
        assert_eq!(config.error_log_path(), PathBuf::from(DEFAULT_ERROR_LOG));
        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(config.duplicate_policy(), DuplicatePolicy::Earlier);
    }

    #[test]
    fn test_out_of_range_concurrency_rejected() {
        let config =
            ExportConfig::from_json(&base_json(r#", "page": "Icons", "concurrency": 0"#)).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("concurrency"), "got: {err}");
    }

    #[test]
    fn test_duplicate_policy_parses_lowercase() {
        let config =
            ExportConfig::from_json(&base_json(r#", "page": "P", "duplicatePolicy": "later""#))
                .unwrap();
        assert_eq!(config.duplicate_policy(), DuplicatePolicy::Later);
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = ExportConfig::load(Path::new("/nonexistent/icons-config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("icons-config.json"));
    }
}
