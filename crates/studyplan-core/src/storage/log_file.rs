//! JSON file log sink.
//!
//! Keeps the whole log as one pretty-printed JSON array. Every append writes
//! a new copy next to the log and renames it into place, so the file on disk
//! is always a complete document holding every earlier event.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::LogSinkError;
use crate::events::LogEvent;
use crate::log_sink::LogSink;

/// Appends events to a JSON array file.
#[derive(Debug, Clone)]
pub struct JsonFileLogSink {
    path: PathBuf,
}

impl JsonFileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every event recorded so far. A missing or empty file is an
    /// empty log.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a JSON array of
    /// log events.
    pub fn read_all(&self) -> Result<Vec<LogEvent>, LogSinkError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(LogSinkError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl LogSink for JsonFileLogSink {
    fn append(&mut self, event: &LogEvent) -> Result<(), LogSinkError> {
        let mut events = self.read_all()?;
        events.push(event.clone());
        let content = serde_json::to_string_pretty(&events)?;
        write_atomically(&self.path, content.as_bytes()).map_err(|source| LogSinkError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Write `content` to a temporary file beside `path`, then rename it over
/// `path`. On failure `path` is left as it was and the temporary is removed.
fn write_atomically(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
