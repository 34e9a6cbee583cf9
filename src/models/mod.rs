// src/models/mod.rs

//! Domain models for the filter.
//!
//! This module contains the data structures shared by the pipeline stages,
//! organized by their primary purpose.

mod config;
mod criteria;
mod plan;
mod record;

// Re-export all public types
pub use config::{Config, LoggingConfig, MatchingConfig, OutputConfig};
pub use criteria::{
    Category, CriteriaSet, CriteriaSource, FieldMatch, NegativeFilter, SCAN_KEY, ScanMode,
    TEXTFILE_KEY,
};
pub use plan::{OutputTargets, ScanPlan};
pub use record::{Capture, Record, RecordStore, TIMESTAMP_FIELD, UrlField};
