//! Output sinks for matched captures.
//!
//! Every sink is append-only while a run is in progress. Files are opened,
//! appended to and closed on each write; no handle outlives a single call.
//!
//! ## Sinks
//!
//! ```text
//! PlainListSink   links.txt    one viewer link per line
//! HtmlListSink    links.html   header, one <li> per link, footer
//! JsonArraySink   results.json matched records as one JSON array
//! ```

pub mod html;
pub mod json;
pub mod plain;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{OutputTargets, Record};

// Re-export for convenience
pub use html::HtmlListSink;
pub use json::JsonArraySink;
pub use plain::PlainListSink;

/// A destination for match events.
pub trait LinkSink {
    /// Called once before the first record is evaluated.
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called once per match event with the viewer link and matched record.
    fn write(&mut self, link: &str, record: &Record) -> Result<()>;

    /// Called once after the last record.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    /// File this sink writes to.
    fn path(&self) -> &Path;
}

/// Append `bytes` to `path`, creating the file if needed.
pub(crate) fn append_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(())
}

/// Check every requested output path before anything is written.
///
/// Existing files are refused unless `force` is set, in which case they are
/// truncated. Missing parent directories are created.
pub fn prepare_outputs(targets: &OutputTargets, force: bool) -> Result<()> {
    for (option, path) in targets.paths() {
        if path.exists() {
            if !force {
                return Err(AppError::config(format!(
                    "{} file {} already exists, use --force to overwrite",
                    option,
                    path.display()
                )));
            }
            log::warn!("Overwriting existing file {}", path.display());
            fs::write(path, b"")?;
        } else if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}

/// The sinks active for one run, driven together.
#[derive(Default)]
pub struct OutputSet {
    sinks: Vec<Box<dyn LinkSink>>,
}

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn LinkSink>) {
        self.sinks.push(sink);
    }

    pub fn begin(&mut self) -> Result<()> {
        for sink in &mut self.sinks {
            log::debug!("Opening output {}", sink.path().display());
            sink.begin()?;
        }
        Ok(())
    }

    pub fn write(&mut self, link: &str, record: &Record) -> Result<()> {
        for sink in &mut self.sinks {
            sink.write(link, record)?;
        }
        Ok(())
    }

    pub fn finish(&mut self) -> Result<()> {
        for sink in &mut self.sinks {
            sink.finish()?;
            log::info!("Wrote {}", sink.path().display());
        }
        Ok(())
    }
}
