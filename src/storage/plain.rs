//! Plain text link list.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::Record;
use crate::storage::{LinkSink, append_bytes};

/// Writes one viewer link per line, ready for `wget -i`.
#[derive(Debug, Clone)]
pub struct PlainListSink {
    path: PathBuf,
}

impl PlainListSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LinkSink for PlainListSink {
    fn write(&mut self, link: &str, _record: &Record) -> Result<()> {
        append_bytes(&self.path, format!("{link}\n").as_bytes())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
