//! Spreadsheet sink trait, typed cell values and an in-memory implementation.

use crate::error::Result;
use polars::prelude::AnyValue;
use serde::{Serialize, Serializer};
use std::fmt;

/// One published cell.
///
/// Numbers stay numbers all the way to the target so a worksheet receives
/// numeric cells rather than their text rendering. Missing values are
/// [`SheetCell::Empty`].
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    Empty,
    Text(String),
    Number(f64),
    Integer(i64),
    Bool(bool),
}

impl SheetCell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl From<&AnyValue<'_>> for SheetCell {
    fn from(value: &AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Self::Empty,
            AnyValue::String(s) => Self::Text(s.to_string()),
            AnyValue::StringOwned(s) => Self::Text(s.to_string()),
            AnyValue::Boolean(b) => Self::Bool(*b),
            AnyValue::Float64(f) => Self::Number(*f),
            AnyValue::Float32(f) => Self::Number(f64::from(*f)),
            AnyValue::Int64(i) => Self::Integer(*i),
            AnyValue::Int32(i) => Self::Integer(i64::from(*i)),
            AnyValue::Int16(i) => Self::Integer(i64::from(*i)),
            AnyValue::Int8(i) => Self::Integer(i64::from(*i)),
            AnyValue::UInt32(i) => Self::Integer(i64::from(*i)),
            AnyValue::UInt16(i) => Self::Integer(i64::from(*i)),
            AnyValue::UInt8(i) => Self::Integer(i64::from(*i)),
            AnyValue::UInt64(i) => match i64::try_from(*i) {
                Ok(i) => Self::Integer(i),
                Err(_) => Self::Number(*i as f64),
            },
            other => Self::Text(other.to_string()),
        }
    }
}

/// Spreadsheet text rendering. Floats use `Display`, so `1.0` renders as `1`.
impl fmt::Display for SheetCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Numbers serialize as JSON numbers, missing cells as `""`.
impl Serialize for SheetCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_str(""),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// A worksheet whose contents can be replaced wholesale.
pub trait SpreadsheetSink {
    /// Human-readable target name, used in log lines.
    fn name(&self) -> &str;

    /// Remove all existing contents.
    fn clear(&mut self) -> Result<()>;

    /// Write `rows` starting at the top-left cell. The first row is the header.
    fn write_rows(&mut self, rows: &[Vec<SheetCell>]) -> Result<()>;
}

/// One recorded call against a [`MemorySheetSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCall {
    Clear,
    Write(Vec<Vec<SheetCell>>),
}

/// Records every call and keeps the resulting worksheet contents.
#[derive(Debug, Clone, Default)]
pub struct MemorySheetSink {
    name: String,
    calls: Vec<SheetCall>,
    contents: Vec<Vec<SheetCell>>,
}

impl MemorySheetSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Worksheet with some pre-existing rows.
    pub fn with_contents(name: impl Into<String>, contents: Vec<Vec<SheetCell>>) -> Self {
        Self {
            name: name.into(),
            calls: Vec::new(),
            contents,
        }
    }

    pub fn calls(&self) -> &[SheetCall] {
        &self.calls
    }

    pub fn contents(&self) -> &[Vec<SheetCell>] {
        &self.contents
    }
}

impl SpreadsheetSink for MemorySheetSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn clear(&mut self) -> Result<()> {
        self.calls.push(SheetCall::Clear);
        self.contents.clear();
        Ok(())
    }

    fn write_rows(&mut self, rows: &[Vec<SheetCell>]) -> Result<()> {
        self.calls.push(SheetCall::Write(rows.to_vec()));
        for (i, row) in rows.iter().enumerate() {
            match self.contents.get_mut(i) {
                Some(existing) => *existing = row.clone(),
                None => self.contents.push(row.clone()),
            }
        }
        Ok(())
    }
}
