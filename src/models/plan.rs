//! Per-run settings handed to the scan pipeline.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::{Config, CriteriaSource, ScanMode};
use crate::utils::url::UrlPolicy;

/// Output files requested for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTargets {
    /// Plain list of viewer links, one per line
    pub plain_list: Option<PathBuf>,
    /// HTML list of viewer links
    pub html_list: Option<PathBuf>,
    /// JSON array of matched records
    pub json_array: Option<PathBuf>,
    /// JSON array of records matched in field mode
    pub field_output: Option<PathBuf>,
}

impl OutputTargets {
    /// All requested paths with the option that requested them.
    pub fn paths(&self) -> Vec<(&'static str, &Path)> {
        [
            ("make_list", self.plain_list.as_deref()),
            ("make_html", self.html_list.as_deref()),
            ("json_out", self.json_array.as_deref()),
            ("outfile", self.field_output.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, path)| path.map(|p| (name, p)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.paths().is_empty()
    }
}

/// Everything the core needs to know about one run.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    pub criteria: CriteriaSource,
    pub exclude_terms: Vec<String>,
    pub case_sensitive: bool,
    pub quiet: bool,
    pub url_policy: UrlPolicy,
    pub archive_base: String,
    pub html_title: String,
    pub outputs: OutputTargets,
    /// Truncate output files that already exist instead of refusing
    pub force: bool,
}

impl ScanPlan {
    /// Create a plan for `criteria` with defaults taken from `config`.
    pub fn new(criteria: CriteriaSource, config: &Config) -> Self {
        Self {
            criteria,
            exclude_terms: Vec::new(),
            case_sensitive: config.matching.case_sensitive,
            quiet: false,
            url_policy: config.output.url_policy,
            archive_base: config.output.archive_base.clone(),
            html_title: config.output.html_title.clone(),
            outputs: OutputTargets::default(),
            force: false,
        }
    }

    pub fn mode(&self) -> ScanMode {
        self.criteria.mode()
    }

    /// Reject output combinations the selected mode cannot honour.
    pub fn validate(&self) -> Result<()> {
        let outputs = &self.outputs;

        if self.mode() == ScanMode::Field {
            if outputs.plain_list.is_some() {
                return Err(AppError::conflict("--field cannot be used with --make-list"));
            }
            if outputs.html_list.is_some() {
                return Err(AppError::conflict("--field cannot be used with --make-html"));
            }
            if outputs.json_array.is_some() {
                return Err(AppError::conflict(
                    "--field cannot be used with --json-out, use --outfile instead",
                ));
            }
        } else if outputs.field_output.is_some() {
            return Err(AppError::conflict("--outfile is only used with --field"));
        }

        let paths = outputs.paths();
        for (i, (name, path)) in paths.iter().enumerate() {
            if let Some((other, _)) = paths[..i].iter().find(|(_, p)| p == path) {
                return Err(AppError::conflict(format!(
                    "--{} and --{} both write to {}",
                    other.replace('_', "-"),
                    name.replace('_', "-"),
                    path.display()
                )));
            }
        }

        Ok(())
    }
}
