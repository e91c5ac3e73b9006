//! Append-only line sinks.

use crate::error::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Consumer of append-only text lines.
///
/// Implementations must be `Send + Sync` so a [`crate::Pipeline`] holding
/// them can be moved to another thread.
pub trait LineSink: Send + Sync {
    /// Append one line. The line carries no trailing newline.
    fn append_line(&self, line: &str) -> Result<()>;
}

/// Appends lines to a file, creating it on first write.
#[derive(Debug, Clone)]
pub struct FileLineSink {
    path: PathBuf,
}

impl FileLineSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LineSink for FileLineSink {
    fn append_line(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default)]
pub struct MemoryLineSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryLineSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines appended so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl LineSink for MemoryLineSink {
    fn append_line(&self, line: &str) -> Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line.to_string());
        Ok(())
    }
}

/// Discards every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLineSink;

impl LineSink for NullLineSink {
    fn append_line(&self, _line: &str) -> Result<()> {
        Ok(())
    }
}
