//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::url::UrlPolicy;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Term comparison settings
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Link and output file settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let base = self.output.archive_base.trim();
        if base.is_empty() {
            return Err(AppError::config("output.archive_base is empty"));
        }
        if !base.ends_with('/') {
            return Err(AppError::config("output.archive_base must end with '/'"));
        }
        if self.output.html_title.trim().is_empty() {
            return Err(AppError::config("output.html_title is empty"));
        }
        Ok(())
    }
}

/// Term comparison settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Compare terms without folding case
    #[serde(default)]
    pub case_sensitive: bool,
}

/// Link and output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// How the archived URL is rendered into a viewer link
    #[serde(default)]
    pub url_policy: UrlPolicy,

    /// Viewer prefix; the timestamp and target are appended
    #[serde(default = "defaults::archive_base")]
    pub archive_base: String,

    /// `<title>` of generated HTML lists
    #[serde(default = "defaults::html_title")]
    pub html_title: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            url_policy: UrlPolicy::default(),
            archive_base: defaults::archive_base(),
            html_title: defaults::html_title(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn archive_base() -> String {
        "https://web.archive.org/web/".into()
    }
    pub fn html_title() -> String {
        "CDX results".into()
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
