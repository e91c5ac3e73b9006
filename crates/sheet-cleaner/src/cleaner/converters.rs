//! Time-of-day conversion for trip time columns.

use crate::error::Result;
use crate::utils::require_series;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TIME_OF_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*$").expect("Invalid regex: HH:MM"));

/// Parse an "HH:MM" string into minutes since midnight.
///
/// Hours must be 0-23 and minutes 0-59; anything else yields `None`.
pub fn parse_time_of_day(value: &str) -> Option<i64> {
    let caps = TIME_OF_DAY.captures(value)?;
    let hours: i64 = caps[1].parse().ok()?;
    let minutes: i64 = caps[2].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Counts from converting one time column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeConversion {
    pub column: String,
    /// Cells that parsed to minutes.
    pub converted: usize,
    /// Present cells that did not parse and are now missing.
    pub malformed: usize,
}

/// Replace an "HH:MM" column with Int64 minutes since midnight.
///
/// Non-string cells are rendered as text first, so numbers in a time column
/// are treated as malformed rather than as minutes.
pub fn convert_time_column(df: &mut DataFrame, col_name: &str) -> Result<TimeConversion> {
    let series = require_series(df, col_name)?.cast(&DataType::String)?;
    let str_series = series.str()?;

    let mut minutes: Vec<Option<i64>> = Vec::with_capacity(str_series.len());
    let mut malformed = 0;

    for opt_val in str_series.into_iter() {
        match opt_val {
            Some(val) => {
                let parsed = parse_time_of_day(val);
                if parsed.is_none() {
                    malformed += 1;
                }
                minutes.push(parsed);
            }
            None => minutes.push(None),
        }
    }

    let converted = minutes.iter().filter(|m| m.is_some()).count();
    df.replace(col_name, Series::new(col_name.into(), minutes))?;

    Ok(TimeConversion {
        column: col_name.to_string(),
        converted,
        malformed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(parse_time_of_day("08:30"), Some(510));
        assert_eq!(parse_time_of_day("23:59"), Some(1439));
        assert_eq!(parse_time_of_day("00:00"), Some(0));
        assert_eq!(parse_time_of_day("8:05"), Some(485));
        assert_eq!(parse_time_of_day(" 17:00 "), Some(1020));
    }

    #[test]
    fn test_parse_time_of_day_malformed() {
        assert_eq!(parse_time_of_day("abc"), None);
        assert_eq!(parse_time_of_day(""), None);
        assert_eq!(parse_time_of_day("24:00"), None);
        assert_eq!(parse_time_of_day("12:60"), None);
        assert_eq!(parse_time_of_day("12:5"), None);
        assert_eq!(parse_time_of_day("12:30:00"), None);
        assert_eq!(parse_time_of_day("bad"), None);
    }

    #[test]
    fn test_convert_time_column() {
        let mut df = df![
            "start" => [Some("08:00"), Some("09:30"), Some("bad"), None],
        ]
        .unwrap();

        let outcome = convert_time_column(&mut df, "start").unwrap();

        assert_eq!(outcome.converted, 2);
        assert_eq!(outcome.malformed, 1);
        let col = df.column("start").unwrap();
        assert_eq!(col.dtype(), &DataType::Int64);
        assert_eq!(col.null_count(), 2);
        assert_eq!(col.get(0).unwrap().try_extract::<i64>().unwrap(), 480);
        assert_eq!(col.get(1).unwrap().try_extract::<i64>().unwrap(), 570);
    }

    #[test]
    fn test_convert_numeric_column_is_malformed() {
        let mut df = df!["start" => [830i64, 900]].unwrap();

        let outcome = convert_time_column(&mut df, "start").unwrap();

        assert_eq!(outcome.converted, 0);
        assert_eq!(outcome.malformed, 2);
    }
}
