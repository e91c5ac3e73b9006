//! Output sinks.
//!
//! The pipeline never touches global logging state or a spreadsheet client
//! directly. Instead it is handed sink objects:
//!
//! - [`LineSink`] - append-only text lines, used for the operational log and
//!   the report log ([`OperationalLog`], [`ReportLog`])
//! - [`SpreadsheetSink`] - replace-contents target for the cleaned table
//!
//! # Implementing a New Spreadsheet Sink
//!
//! Implement [`SpreadsheetSink::clear`] and [`SpreadsheetSink::write_rows`].
//! The pipeline always calls `clear` first and then `write_rows` once with
//! the header row followed by the records; it never appends. Cells arrive as
//! [`SheetCell`] values so numeric targets can keep numbers numeric.

mod csv_file;
#[cfg(feature = "sheets")]
mod google_sheets;
mod line;
mod logs;
mod spreadsheet;

pub use csv_file::CsvFileSink;
#[cfg(feature = "sheets")]
pub use google_sheets::{GoogleSheetsConfig, GoogleSheetsSink, SpreadsheetTarget};
pub use line::{FileLineSink, LineSink, MemoryLineSink, NullLineSink};
pub use logs::{LogLevel, OperationalLog, ReportLog};
pub use spreadsheet::{MemorySheetSink, SheetCall, SheetCell, SpreadsheetSink};
