//! Shared utilities for the cleaning pipeline.
//!
//! Helpers used by more than one stage: column lookup with schema errors,
//! float casting, null filling and table rendering.

use crate::error::{PipelineError, Result};
use crate::sinks::SheetCell;
use polars::prelude::*;

// =============================================================================
// Column Access
// =============================================================================

/// Fetch a column as a materialized Series, mapping absence to a schema error.
pub fn require_series<'a>(df: &'a DataFrame, col_name: &str) -> Result<&'a Series> {
    df.column(col_name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| PipelineError::ColumnNotFound(col_name.to_string()))
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Cast a Series to Float64. Unparseable values become null.
pub fn to_float_series(series: &Series) -> PolarsResult<Series> {
    series.cast(&DataType::Float64)
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a Float64 Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let filled = series
        .f64()?
        .apply(|v| Some(v.unwrap_or(fill_value)));
    Ok(filled.into_series())
}

/// Replace NaN and infinite values in a Float64 Series with nulls.
pub fn null_non_finite(series: &Series) -> PolarsResult<(Series, usize)> {
    let ca = series.f64()?;
    let non_finite = ca
        .into_iter()
        .filter(|v| v.map(|val| !val.is_finite()).unwrap_or(false))
        .count();
    let cleaned = ca.apply(|v| v.filter(|val| val.is_finite()));
    Ok((cleaned.into_series(), non_finite))
}

// =============================================================================
// Rendering
// =============================================================================

/// Render a table as a header row followed by one row per record.
///
/// Cells keep their type; missing values become [`SheetCell::Empty`].
pub fn table_to_rows(df: &DataFrame) -> Result<Vec<Vec<SheetCell>>> {
    let mut rows = Vec::with_capacity(df.height() + 1);
    rows.push(
        df.get_column_names()
            .iter()
            .map(|name| SheetCell::text(name.as_str()))
            .collect(),
    );

    let columns: Vec<&Series> = df
        .get_columns()
        .iter()
        .map(|col| col.as_materialized_series())
        .collect();

    for i in 0..df.height() {
        let mut row = Vec::with_capacity(columns.len());
        for series in &columns {
            row.push(SheetCell::from(&series.get(i)?));
        }
        rows.push(row);
    }

    Ok(rows)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_series_missing() {
        let df = df!["a" => [1, 2]].unwrap();
        let err = require_series(&df, "Wiek").unwrap_err();
        assert!(matches!(err, PipelineError::ColumnNotFound(name) if name == "Wiek"));
    }

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_to_float_series_non_strict() {
        let series = Series::new("x".into(), &[Some("1.5"), Some("abc"), None]);
        let floats = to_float_series(&series).unwrap();
        assert_eq!(floats.dtype(), &DataType::Float64);
        assert_eq!(floats.null_count(), 2);
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1.0), None, Some(3.0)]);
        let filled = fill_numeric_nulls(&series, 0.0).unwrap();

        assert_eq!(filled.name().as_str(), "test");
        assert_eq!(filled.get(0).unwrap().try_extract::<f64>().unwrap(), 1.0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 0.0);
        assert_eq!(filled.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_null_non_finite() {
        let series = Series::new(
            "x".into(),
            &[Some(1.0), Some(f64::NAN), Some(f64::INFINITY), None, Some(f64::NEG_INFINITY)],
        );
        let (cleaned, replaced) = null_non_finite(&series).unwrap();
        assert_eq!(replaced, 3);
        assert_eq!(cleaned.null_count(), 4);
    }

    #[test]
    fn test_table_to_rows() {
        let df = df![
            "Wiek" => [Some(0.0), None],
            "Wykształcenie" => [2i64, -1],
        ]
        .unwrap();
        let rows = table_to_rows(&df).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            vec![SheetCell::text("Wiek"), SheetCell::text("Wykształcenie")]
        );
        assert_eq!(rows[1], vec![SheetCell::Number(0.0), SheetCell::Integer(2)]);
        assert_eq!(rows[2], vec![SheetCell::Empty, SheetCell::Integer(-1)]);
    }
}
