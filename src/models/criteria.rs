//! Criteria sets, negative filters and criteria source selection.

use std::fmt;
use std::path::PathBuf;

use crate::error::{AppError, Result};

/// Category key used for ad-hoc `--scan` terms.
pub const SCAN_KEY: &str = "scan";

/// Category key used for terms read from a text file.
pub const TEXTFILE_KEY: &str = "textfile";

/// The positive-criteria strategy active for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Scan,
    Textfile,
    Json,
    Field,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Scan => "scan",
            ScanMode::Textfile => "textfile",
            ScanMode::Json => "json",
            ScanMode::Field => "field",
        }
    }

    /// Whether hits are counted per category rather than as one total.
    pub fn counts_per_category(&self) -> bool {
        matches!(self, ScanMode::Json)
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named group of search terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub key: String,
    pub terms: Vec<String>,
}

impl Category {
    pub fn new(key: impl Into<String>, terms: Vec<String>) -> Self {
        Self {
            key: key.into(),
            terms,
        }
    }
}

/// Category key to ordered term list, built once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriteriaSet {
    mode: ScanMode,
    categories: Vec<Category>,
}

impl CriteriaSet {
    pub fn new(mode: ScanMode, categories: Vec<Category>) -> Self {
        Self { mode, categories }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.key.as_str())
    }

    pub fn term_count(&self) -> usize {
        self.categories.iter().map(|c| c.terms.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.term_count() == 0
    }
}

/// Exact equality test against one named record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    pub field: String,
    pub value: String,
}

impl FieldMatch {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Exclusion terms checked against every candidate URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NegativeFilter {
    terms: Vec<String>,
}

impl NegativeFilter {
    pub fn new(terms: Vec<String>) -> Self {
        Self {
            terms: terms.into_iter().filter(|t| !t.is_empty()).collect(),
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Where the run's positive criteria come from. Exactly one per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaSource {
    /// Comma-separated terms given inline
    Scan(String),
    /// Text file, one term per line
    TextFile(PathBuf),
    /// JSON object of category key to comma-separated terms
    JsonFile(PathBuf),
    /// Exact field equality
    Field(FieldMatch),
}

impl CriteriaSource {
    /// Pick the single criteria source out of the optional ones a caller collected.
    ///
    /// `field` must hold exactly a key and a value.
    pub fn select(
        scan: Option<String>,
        textfile: Option<PathBuf>,
        json: Option<PathBuf>,
        field: Option<Vec<String>>,
    ) -> Result<Self> {
        let field = field
            .map(|values| match <[String; 2]>::try_from(values) {
                Ok([key, value]) => Ok(FieldMatch::new(key, value)),
                Err(values) => Err(AppError::conflict(format!(
                    "--field takes a key and a value, got {} argument(s)",
                    values.len()
                ))),
            })
            .transpose()?;

        let mut selected: Vec<CriteriaSource> = [
            scan.map(CriteriaSource::Scan),
            textfile.map(CriteriaSource::TextFile),
            json.map(CriteriaSource::JsonFile),
            field.map(CriteriaSource::Field),
        ]
        .into_iter()
        .flatten()
        .collect();

        match selected.len() {
            0 => Err(AppError::conflict(
                "specify one of --scan, --textfile, --json or --field",
            )),
            1 => Ok(selected.remove(0)),
            _ => Err(AppError::conflict(
                "only one of --scan, --textfile, --json or --field may be used",
            )),
        }
    }

    pub fn mode(&self) -> ScanMode {
        match self {
            CriteriaSource::Scan(_) => ScanMode::Scan,
            CriteriaSource::TextFile(_) => ScanMode::Textfile,
            CriteriaSource::JsonFile(_) => ScanMode::Json,
            CriteriaSource::Field(_) => ScanMode::Field,
        }
    }
}
