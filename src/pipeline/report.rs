// src/pipeline/report.rs

//! Hit counters and the end-of-run summary.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::models::{CriteriaSet, OutputTargets, ScanMode};

/// Hit totals, either one number or one per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Counters {
    Single(u64),
    PerCategory(Vec<(String, u64)>),
}

impl Counters {
    /// Zeroed counters shaped for `criteria`.
    pub fn for_criteria(criteria: &CriteriaSet) -> Self {
        if criteria.mode().counts_per_category() {
            Counters::PerCategory(criteria.keys().map(|key| (key.to_string(), 0)).collect())
        } else {
            Counters::Single(0)
        }
    }

    pub fn single() -> Self {
        Counters::Single(0)
    }

    /// Record one hit for `category`. Single counters ignore the key.
    pub fn increment(&mut self, category: &str) {
        match self {
            Counters::Single(count) => *count += 1,
            Counters::PerCategory(counts) => {
                if let Some((_, count)) = counts.iter_mut().find(|(key, _)| key == category) {
                    *count += 1;
                }
            }
        }
    }

    /// Hits recorded for `category`; the single total for single counters.
    pub fn get(&self, category: &str) -> Option<u64> {
        match self {
            Counters::Single(count) => Some(*count),
            Counters::PerCategory(counts) => counts
                .iter()
                .find(|(key, _)| key == category)
                .map(|(_, count)| *count),
        }
    }

    pub fn total(&self) -> u64 {
        match self {
            Counters::Single(count) => *count,
            Counters::PerCategory(counts) => counts.iter().map(|(_, count)| count).sum(),
        }
    }

    /// Per-category counts as a JSON object, `None` for single counters.
    pub fn breakdown(&self) -> Option<Value> {
        match self {
            Counters::Single(_) => None,
            Counters::PerCategory(counts) => Some(Value::Object(
                counts
                    .iter()
                    .map(|(key, count)| (key.clone(), Value::from(*count)))
                    .collect::<Map<_, _>>(),
            )),
        }
    }
}

/// Outcome of one scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub mode: ScanMode,
    pub case_sensitive: bool,
    pub counts: Counters,
    pub records_scanned: usize,
    /// Records vetoed by the negative filter
    pub records_excluded: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outputs: OutputTargets,
}

impl ScanReport {
    pub fn total(&self) -> u64 {
        self.counts.total()
    }

    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Console summary, one entry per line.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![String::new(), "Scan complete.".to_string()];

        lines.push(if self.case_sensitive {
            "Performed case -sensitive- search.".to_string()
        } else {
            "Performed case insensitive search.".to_string()
        });

        if let Some(breakdown) = self.counts.breakdown() {
            lines.push(String::new());
            lines.push("Results:".to_string());
            lines.push(serde_json::to_string_pretty(&breakdown).unwrap_or_default());
            lines.push(String::new());
        }

        lines.push(format!("Found: {} files.", self.total()));
        if self.records_excluded > 0 {
            lines.push(format!(
                "Excluded: {} of {} records.",
                self.records_excluded, self.records_scanned
            ));
        }
        lines.push(format!("Execution time: {:.3} seconds", self.elapsed_secs()));

        if let Some(path) = &self.outputs.plain_list {
            let path = path.display();
            lines.push(String::new());
            lines.push("To use the generated list with wget, issue this command:".to_string());
            lines.push(format!("wget -i {path}"));
            lines.push("To omit files being saved into folders with timestamps, use this:".to_string());
            lines.push(format!("wget --convert-links -x -nH --cut-dirs=2 -i {path}"));
        }
        if let Some(path) = &self.outputs.html_list {
            lines.push(String::new());
            lines.push(format!("HTML file list saved as {}", path.display()));
        }
        if let Some(path) = self
            .outputs
            .json_array
            .as_ref()
            .or(self.outputs.field_output.as_ref())
        {
            lines.push(String::new());
            lines.push(format!("JSON results saved as {}", path.display()));
        }

        lines
    }
}
