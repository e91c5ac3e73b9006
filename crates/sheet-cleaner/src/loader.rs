//! CSV table loading.
//!
//! Reads the input dataset into a `DataFrame`. Empty cells become nulls, and
//! NaN/infinite floats are replaced by nulls so every missing value has one
//! representation before the pipeline runs.

use crate::error::{PipelineError, Result, ResultExt};
use crate::utils::null_non_finite;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Number of rows used for schema inference.
const INFER_SCHEMA_ROWS: usize = 100;

/// Load a CSV file with multiple fallback strategies.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PipelineError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input file not found: {}", path.display()),
        )));
    }

    debug!("Reading {}", path.display());
    let mut df = read_with_fallbacks(path)?;
    sanitize_non_finite(&mut df)?;
    debug!("Parsed {} rows x {} columns", df.height(), df.width());

    Ok(df)
}

/// Load CSV content already held in memory.
pub fn load_csv_str(content: &str) -> Result<DataFrame> {
    let mut df = CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(content.to_string()))
        .finish()
        .context("Parsing CSV content")?;
    sanitize_non_finite(&mut df)?;
    Ok(df)
}

fn read_with_fallbacks(path: &Path) -> Result<DataFrame> {
    // Strategy 1: standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: without quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(None))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Loading without quotes failed: {}", e);
        }
    }

    // Strategy 3: pre-clean content
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cleaned = clean_csv_content(&content);
            CsvReadOptions::default()
                .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
                .with_has_header(true)
                .into_reader_with_file_handle(Cursor::new(cleaned))
                .finish()
                .context(format!("Reading {}", path.display()))
        }
        Err(e) => {
            error!("Could not read file: {}", e);
            Err(e.into())
        }
    }
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace NaN and infinite values in float columns with nulls.
pub fn sanitize_non_finite(df: &mut DataFrame) -> Result<usize> {
    let float_columns: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| matches!(col.dtype(), DataType::Float32 | DataType::Float64))
        .map(|col| col.name().to_string())
        .collect();

    let mut replaced = 0;
    for col_name in float_columns {
        let series = df
            .column(&col_name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let (cleaned, count) = null_non_finite(&series)?;
        if count > 0 {
            debug!("Replaced {} non-finite values in '{}'", count, col_name);
            df.replace(&col_name, cleaned)?;
            replaced += count;
        }
    }

    Ok(replaced)
}
