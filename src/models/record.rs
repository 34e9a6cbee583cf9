//! Capture records and the loaded record store.

use std::fmt;

use serde_json::Value;

use crate::error::{AppError, Result};

/// One CDX capture: an opaque field name to value mapping.
///
/// Field order is preserved so rewritten JSON output keeps the server's layout.
pub type Record = serde_json::Map<String, Value>;

/// Name of the capture timestamp field.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// The field carrying the captured URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlField {
    /// `file_url`, used by some CDX mirrors
    FileUrl,
    /// `original`, the Wayback CDX server's name
    Original,
}

impl UrlField {
    /// Accepted names, in detection priority order.
    pub const ALL: [UrlField; 2] = [UrlField::FileUrl, UrlField::Original];

    pub fn as_str(&self) -> &'static str {
        match self {
            UrlField::FileUrl => "file_url",
            UrlField::Original => "original",
        }
    }

    /// Detect the URL field from a record's keys.
    pub fn detect(record: &Record) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| record.contains_key(field.as_str()))
    }
}

impl fmt::Display for UrlField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A borrowed view of one record with its position in the store.
#[derive(Debug, Clone, Copy)]
pub struct Capture<'a> {
    pub index: usize,
    pub record: &'a Record,
    url_field: UrlField,
}

impl<'a> Capture<'a> {
    /// The captured URL, read from the store's detected URL field.
    pub fn url(&self) -> Result<&'a str> {
        self.field(self.url_field.as_str())
    }

    /// The capture timestamp.
    pub fn timestamp(&self) -> Result<&'a str> {
        self.field(TIMESTAMP_FIELD)
    }

    /// Any string field by name. Absent and non-string values are both missing.
    pub fn field(&self, name: &str) -> Result<&'a str> {
        self.record
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::missing_field(self.index, name))
    }
}

/// The loaded record array plus the URL field detected from its first record.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
    url_field: UrlField,
}

impl RecordStore {
    pub fn new(records: Vec<Record>, url_field: UrlField) -> Self {
        Self { records, url_field }
    }

    pub fn url_field(&self) -> UrlField {
        self.url_field
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records in input order.
    pub fn captures(&self) -> impl Iterator<Item = Capture<'_>> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| Capture {
                index,
                record,
                url_field: self.url_field,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_detect_prefers_file_url() {
        let r = record(json!({"original": "a", "file_url": "b", "timestamp": "1"}));
        assert_eq!(UrlField::detect(&r), Some(UrlField::FileUrl));

        let r = record(json!({"original": "a", "timestamp": "1"}));
        assert_eq!(UrlField::detect(&r), Some(UrlField::Original));

        let r = record(json!({"urlkey": "a"}));
        assert_eq!(UrlField::detect(&r), None);
    }

    #[test]
    fn test_capture_accessors() {
        let store = RecordStore::new(
            vec![
                record(json!({"original": "http://a.com/", "timestamp": "2020"})),
                record(json!({"original": "http://b.com/", "timestamp": 2021})),
            ],
            UrlField::Original,
        );

        let captures: Vec<_> = store.captures().collect();
        assert_eq!(captures[0].url().unwrap(), "http://a.com/");
        assert_eq!(captures[0].timestamp().unwrap(), "2020");

        let err = captures[1].timestamp().unwrap_err();
        assert!(matches!(err, AppError::MissingField { index: 1, .. }));
        assert!(captures[1].field("mimetype").is_err());
    }
}
