// src/pipeline/criteria.rs

//! Criteria set construction for each of the four strategies.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{
    Category, CriteriaSet, CriteriaSource, FieldMatch, NegativeFilter, SCAN_KEY, ScanMode,
    TEXTFILE_KEY,
};

/// Positive criteria for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criteria {
    /// Substring terms grouped by category
    Terms(CriteriaSet),
    /// Exact equality on one field
    Field(FieldMatch),
}

/// Build the criteria named by `source`, reading any files it points at.
pub fn build(source: &CriteriaSource) -> Result<Criteria> {
    let criteria = match source {
        CriteriaSource::Scan(list) => Criteria::Terms(from_scan(list)),
        CriteriaSource::TextFile(path) => Criteria::Terms(from_text_file(path)?),
        CriteriaSource::JsonFile(path) => Criteria::Terms(from_json_file(path)?),
        CriteriaSource::Field(field) => Criteria::Field(field.clone()),
    };

    if let Criteria::Terms(set) = &criteria {
        log::debug!(
            "Built {} criteria: {} categories, {} terms",
            set.mode(),
            set.categories().len(),
            set.term_count()
        );
        if set.is_empty() {
            log::warn!("No search terms were given; nothing can match");
        }
    }

    Ok(criteria)
}

/// Split a comma-separated term list. Empty segments are dropped.
pub fn split_terms(list: &str) -> Vec<String> {
    list.split(',')
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ad-hoc terms, stored under `scan`.
///
/// A trailing or doubled comma leaves an empty segment, which would match
/// every URL; such segments are dropped rather than kept as terms.
pub fn from_scan(list: &str) -> CriteriaSet {
    CriteriaSet::new(
        ScanMode::Scan,
        vec![Category::new(SCAN_KEY, split_terms(list))],
    )
}

/// One term per non-blank line, stored under `textfile`.
///
/// Lines keep their surrounding spaces; only the line ending is stripped.
pub fn from_text(content: &str) -> CriteriaSet {
    let terms = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();
    CriteriaSet::new(ScanMode::Textfile, vec![Category::new(TEXTFILE_KEY, terms)])
}

pub fn from_text_file(path: &Path) -> Result<CriteriaSet> {
    let content = fs::read_to_string(path)?;
    Ok(from_text(&content))
}

/// One category per key of a JSON object whose values are comma-separated terms.
///
/// A top-level array is accepted too; only its first element is used.
pub fn from_json(content: &str) -> Result<CriteriaSet> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| AppError::format(format!("criteria file is not valid JSON: {e}")))?;

    let object = match value {
        Value::Object(object) => object,
        Value::Array(items) => match items.into_iter().next() {
            Some(Value::Object(object)) => object,
            _ => {
                return Err(AppError::format(
                    "criteria file's first element is not an object",
                ));
            }
        },
        _ => return Err(AppError::format("criteria file is not a JSON object")),
    };

    let categories = object
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(list) => Ok(Category::new(key, split_terms(&list))),
            other => Err(AppError::format(format!(
                "criteria key '{key}' must map to a comma-separated string, got {other}"
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CriteriaSet::new(ScanMode::Json, categories))
}

pub fn from_json_file(path: &Path) -> Result<CriteriaSet> {
    let content = fs::read_to_string(path)?;
    from_json(&content)
}

/// Exclusion terms from a comma-separated list.
pub fn negative_filter(list: &str) -> NegativeFilter {
    NegativeFilter::new(split_terms(list))
}
