// src/error.rs

//! Unified error handling for the filter.

use std::fmt;

use thiserror::Error;

/// Result type alias for filter operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Input is not parseable JSON or not a usable top-level array
    #[error("Format error: {0}")]
    Format(String),

    /// First record carries neither `file_url` nor `original`
    #[error("Incompatible CDX format: no `file_url` or `original` field (found: {})", found.join(", "))]
    IncompatibleSchema { found: Vec<String> },

    /// A record lacks a field the active mode needs
    #[error("Record {index} is missing field `{field}`")]
    MissingField { index: usize, field: String },

    /// Ambiguous or contradictory criteria/output selection
    #[error("Criteria conflict: {0}")]
    CriteriaConflict(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Create a format error.
    pub fn format(message: impl fmt::Display) -> Self {
        Self::Format(message.to_string())
    }

    /// Create a missing field error for the record at `index`.
    pub fn missing_field(index: usize, field: impl Into<String>) -> Self {
        Self::MissingField {
            index,
            field: field.into(),
        }
    }

    /// Create a criteria conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::CriteriaConflict(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
