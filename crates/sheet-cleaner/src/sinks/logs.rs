//! Operational and report logs written through [`LineSink`]s.

use super::LineSink;
use crate::error::Result;
use crate::quality::QualityReport;
use chrono::Local;
use std::fmt;
use std::sync::Arc;

/// Severity of an operational log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Timestamped operational log.
///
/// Each line has the shape `YYYY-MM-DD HH:MM:SS - LEVEL - message` and is
/// mirrored to `tracing` at the matching level.
#[derive(Clone)]
pub struct OperationalLog {
    sink: Arc<dyn LineSink>,
}

impl OperationalLog {
    pub fn new(sink: Arc<dyn LineSink>) -> Self {
        Self { sink }
    }

    pub fn info(&self, message: impl AsRef<str>) -> Result<()> {
        self.write(LogLevel::Info, message.as_ref())
    }

    pub fn warn(&self, message: impl AsRef<str>) -> Result<()> {
        self.write(LogLevel::Warning, message.as_ref())
    }

    pub fn error(&self, message: impl AsRef<str>) -> Result<()> {
        self.write(LogLevel::Error, message.as_ref())
    }

    pub fn write(&self, level: LogLevel, message: &str) -> Result<()> {
        match level {
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warning => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        }
        self.sink.append_line(&format_line(level, message))
    }
}

impl fmt::Debug for OperationalLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationalLog").finish_non_exhaustive()
    }
}

fn format_line(level: LogLevel, message: &str) -> String {
    format!(
        "{} - {} - {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        level,
        message
    )
}

/// Two-line quality report.
#[derive(Clone)]
pub struct ReportLog {
    sink: Arc<dyn LineSink>,
}

impl ReportLog {
    pub fn new(sink: Arc<dyn LineSink>) -> Self {
        Self { sink }
    }

    /// Append the modified-cells and discarded-rows percentages.
    pub fn write_report(&self, report: &QualityReport) -> Result<()> {
        for line in report_lines(report) {
            self.sink.append_line(&line)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ReportLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportLog").finish_non_exhaustive()
    }
}

fn report_lines(report: &QualityReport) -> [String; 2] {
    [
        format!(
            "Modified cells (imputed, normalized or encoded): {:.2}%",
            report.modified_percentage
        ),
        format!("Discarded rows: {:.2}%", report.discarded_percentage),
    ]
}
