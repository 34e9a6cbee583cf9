//! Streaming JSON array of matched records.
//!
//! The array is written incrementally: the opening bracket goes out with the
//! first record, a separator precedes each later one, and `finish` closes the
//! array. The file is valid JSON once `finish` returns.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::Record;
use crate::storage::{LinkSink, append_bytes};

/// Collects matched records into one JSON array, one object per line.
#[derive(Debug, Clone)]
pub struct JsonArraySink {
    path: PathBuf,
    written: usize,
}

impl JsonArraySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: 0,
        }
    }

    /// Records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Append one record to the array.
    pub fn push(&mut self, record: &Record) -> Result<()> {
        let separator = if self.written == 0 { "[\n" } else { ",\n" };
        let object = serde_json::to_string(record)?;
        append_bytes(&self.path, format!("{separator}{object}").as_bytes())?;
        self.written += 1;
        Ok(())
    }

    /// Close the array; an empty run produces `[]`.
    pub fn close(&mut self) -> Result<()> {
        let closing = if self.written == 0 { "[]\n" } else { "\n]\n" };
        append_bytes(&self.path, closing.as_bytes())?;
        log::debug!(
            "Closed JSON array of {} records at {}",
            self.written,
            self.path.display()
        );
        Ok(())
    }
}

impl LinkSink for JsonArraySink {
    fn write(&mut self, _link: &str, record: &Record) -> Result<()> {
        self.push(record)
    }

    fn finish(&mut self) -> Result<()> {
        self.close()
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
