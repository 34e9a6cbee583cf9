// src/pipeline/load.rs

//! Record store loading.
//!
//! Accepts the two shapes a CDX server hands out for `output=json`:
//! an array of objects, or a table whose first row names the columns.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Record, RecordStore, UrlField};

/// Read and parse a CDX result file.
pub fn load_records(path: &Path) -> Result<RecordStore> {
    let content = fs::read_to_string(path)?;
    let store = parse_records(&content)?;
    log::info!(
        "Loaded {} records from {} (url field: {})",
        store.len(),
        path.display(),
        store.url_field()
    );
    Ok(store)
}

/// Parse CDX results and detect the URL field from the first record.
pub fn parse_records(content: &str) -> Result<RecordStore> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| AppError::format(format!("input is not valid JSON: {e}")))?;

    let Value::Array(items) = value else {
        return Err(AppError::format("input is not a JSON array"));
    };

    let records = match items.first() {
        None => return Err(AppError::format("input contains no records")),
        Some(Value::Array(_)) => table_to_records(items)?,
        Some(_) => objects_to_records(items)?,
    };

    let first = records
        .first()
        .ok_or_else(|| AppError::format("input contains no records"))?;
    let url_field = UrlField::detect(first).ok_or_else(|| AppError::IncompatibleSchema {
        found: first.keys().cloned().collect(),
    })?;

    Ok(RecordStore::new(records, url_field))
}

fn objects_to_records(items: Vec<Value>) -> Result<Vec<Record>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(AppError::format(format!(
                "element {index} is not an object: {other}"
            ))),
        })
        .collect()
}

/// Zip each row of a CDX table with its header row.
fn table_to_records(items: Vec<Value>) -> Result<Vec<Record>> {
    let mut rows = items.into_iter();

    let header: Vec<String> = match rows.next() {
        Some(Value::Array(names)) => names
            .into_iter()
            .map(|name| match name {
                Value::String(s) => Ok(s),
                other => Err(AppError::format(format!(
                    "header row holds a non-string column name: {other}"
                ))),
            })
            .collect::<Result<_>>()?,
        _ => return Err(AppError::format("table input has no header row")),
    };

    rows.enumerate()
        .map(|(index, row)| match row {
            Value::Array(cells) => Ok(header.iter().cloned().zip(cells).collect()),
            other => Err(AppError::format(format!(
                "row {} is not an array: {other}",
                index + 1
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_object_array() {
        let store = parse_records(
            r#"[{"original":"http://a.com/x.jpg","timestamp":"20200101"},
                {"original":"http://a.com/y.png","timestamp":"20200102"}]"#,
        )
        .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.url_field(), UrlField::Original);
    }

    #[test]
    fn test_parse_file_url_records() {
        let store =
            parse_records(r#"[{"file_url":"http://a.com/","timestamp":"2004"}]"#).unwrap();
        assert_eq!(store.url_field(), UrlField::FileUrl);
    }

    #[test]
    fn test_parse_cdx_table() {
        let store = parse_records(
            r#"[["urlkey","timestamp","original","mimetype"],
                ["com,a)/","20200101000000","http://a.com/","text/html"],
                ["com,a)/x.jpg","20200102000000","http://a.com/x.jpg"]]"#,
        )
        .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.url_field(), UrlField::Original);

        let captures: Vec<_> = store.captures().collect();
        assert_eq!(captures[0].field("mimetype").unwrap(), "text/html");
        assert_eq!(captures[1].url().unwrap(), "http://a.com/x.jpg");
        assert!(captures[1].field("mimetype").is_err());
    }

    #[test]
    fn test_rejects_invalid_json_and_non_arrays() {
        assert!(matches!(
            parse_records("not json"),
            Err(AppError::Format(_))
        ));
        assert!(matches!(
            parse_records(r#"{"original":"x"}"#),
            Err(AppError::Format(_))
        ));
        assert!(matches!(parse_records("[]"), Err(AppError::Format(_))));
        assert!(matches!(
            parse_records(r#"[{"original":"x","timestamp":"1"}, 5]"#),
            Err(AppError::Format(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_schema() {
        let err = parse_records(r#"[{"url":"http://a.com/","timestamp":"1"}]"#).unwrap_err();
        match err {
            AppError::IncompatibleSchema { found } => {
                assert_eq!(found, vec!["url".to_string(), "timestamp".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_records_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cdx.json");
        fs::write(&path, r#"[{"original":"http://a.com/","timestamp":"1"}]"#).unwrap();

        let store = load_records(&path).unwrap();
        assert_eq!(store.len(), 1);

        assert!(matches!(
            load_records(&tmp.path().join("missing.json")),
            Err(AppError::Io(_))
        ));
    }
}
