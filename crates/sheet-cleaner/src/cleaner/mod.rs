//! Data cleaning module.
//!
//! This module provides functionality for:
//! - Discarding rows that still hold missing values
//! - Converting "HH:MM" time strings to minutes since midnight

mod converters;

pub use converters::{TimeConversion, convert_time_column, parse_time_of_day};

use crate::error::Result;
use crate::utils::require_series;
use polars::prelude::*;
use tracing::debug;

/// Removes rows with missing values.
pub struct RowDiscarder;

impl RowDiscarder {
    /// Remove every row that has a missing value in any column.
    ///
    /// Returns the number of rows discarded.
    pub fn discard_incomplete(df: &mut DataFrame) -> Result<usize> {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
        Self::discard_missing_in(df, &columns)
    }

    /// Remove every row that has a missing value in one of `columns`.
    ///
    /// Returns the number of rows discarded.
    pub fn discard_missing_in(df: &mut DataFrame, columns: &[&str]) -> Result<usize> {
        let before = df.height();

        let mut keep = BooleanChunked::full("keep".into(), true, before);
        for col_name in columns {
            let present = require_series(df, col_name)?.is_not_null();
            keep = &keep & &present;
        }

        *df = df.filter(&keep)?;
        let discarded = before - df.height();
        if discarded > 0 {
            debug!("Discarded {} rows with missing values", discarded);
        }

        Ok(discarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discard_incomplete_any_column() {
        let mut df = df![
            "Wiek" => [Some(25.0), Some(30.0), Some(40.0), Some(50.0)],
            "Miasto" => [Some("Kraków"), None, Some("Gdańsk"), Some("Łódź")],
            "Wykształcenie" => [Some("Wyższe"), Some("Średnie"), None, Some("Podstawowe")],
        ]
        .unwrap();

        let discarded = RowDiscarder::discard_incomplete(&mut df).unwrap();

        assert_eq!(discarded, 2);
        assert_eq!(df.height(), 2);
        for col in df.get_columns() {
            assert_eq!(col.null_count(), 0);
        }
        let wiek = df.column("Wiek").unwrap().f64().unwrap();
        assert_eq!(wiek.get(0), Some(25.0));
        assert_eq!(wiek.get(1), Some(50.0));
    }

    #[test]
    fn test_discard_incomplete_nothing_missing() {
        let mut df = df!["a" => [1, 2, 3], "b" => ["x", "y", "z"]].unwrap();

        let discarded = RowDiscarder::discard_incomplete(&mut df).unwrap();

        assert_eq!(discarded, 0);
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn test_discard_missing_in_subset_only() {
        let mut df = df![
            "start" => [Some(480i64), None, Some(500)],
            "note" => [None::<&str>, Some("x"), None],
        ]
        .unwrap();

        let discarded = RowDiscarder::discard_missing_in(&mut df, &["start"]).unwrap();

        assert_eq!(discarded, 1);
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("note").unwrap().null_count(), 2);
    }

    #[test]
    fn test_discard_incomplete_empty_table() {
        let mut df = df!["a" => Vec::<i64>::new()].unwrap();

        assert_eq!(RowDiscarder::discard_incomplete(&mut df).unwrap(), 0);
    }
}
