//! Local CSV file standing in for a worksheet.

use super::{SheetCell, SpreadsheetSink};
use crate::error::Result;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use tracing::debug;

/// Writes the published table to a CSV file.
///
/// `clear` truncates the file; `write_rows` rewrites it from the first row.
#[derive(Debug, Clone)]
pub struct CsvFileSink {
    path: PathBuf,
    name: String,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl SpreadsheetSink for CsvFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn clear(&mut self) -> Result<()> {
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        Ok(())
    }

    fn write_rows(&mut self, rows: &[Vec<SheetCell>]) -> Result<()> {
        let file = File::create(&self.path)?;
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
        for row in rows {
            writer.write_record(row.iter().map(ToString::to_string))?;
        }
        writer.flush()?;
        debug!("Wrote {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_then_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale,data\n1,2\n3,4\n").unwrap();

        let mut sink = CsvFileSink::new(&path);
        sink.clear().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

        sink.write_rows(&[
            vec![SheetCell::text("Wiek"), SheetCell::text("Wykształcenie")],
            vec![SheetCell::Number(0.5), SheetCell::Integer(2)],
            vec![SheetCell::Empty, SheetCell::Integer(-1)],
        ])
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Wiek,Wykształcenie\n0.5,2\n,-1\n");
    }
}
