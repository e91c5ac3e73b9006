//! Median imputation for numeric columns.

use crate::error::{PipelineError, Result};
use crate::utils::{fill_numeric_nulls, is_numeric_dtype, require_series, to_float_series};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Result of imputing one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationOutcome {
    pub column: String,
    /// Median used for filling. `None` only when the column has no rows.
    pub median: Option<f64>,
    /// Missing count before minus missing count after.
    pub filled: usize,
}

/// Fills missing numeric cells with the median of the present values.
pub struct MedianImputer;

impl MedianImputer {
    /// Impute a column in place, casting it to Float64.
    ///
    /// For an even number of present values the median is the mean of the two
    /// middle values.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::ColumnNotFound`] if the column is absent.
    /// - [`PipelineError::AllMissing`] if the column has rows but none of them
    ///   holds a value.
    pub fn impute(df: &mut DataFrame, col_name: &str) -> Result<ImputationOutcome> {
        let original = require_series(df, col_name)?;
        if !is_numeric_dtype(original.dtype()) {
            warn!(
                "Column '{}' is {}, unparseable values will be imputed",
                col_name,
                original.dtype()
            );
        }
        let series = to_float_series(original)?;
        let missing_before = series.null_count();

        if series.is_empty() {
            return Ok(ImputationOutcome {
                column: col_name.to_string(),
                median: None,
                filled: 0,
            });
        }

        let median = series
            .median()
            .ok_or_else(|| PipelineError::AllMissing(col_name.to_string()))?;

        let filled = fill_numeric_nulls(&series, median)?;
        let missing_after = filled.null_count();
        df.replace(col_name, filled)?;

        let outcome = ImputationOutcome {
            column: col_name.to_string(),
            median: Some(median),
            filled: missing_before - missing_after,
        };
        debug!(
            "Median imputed '{}': {} values with {}",
            col_name, outcome.filled, median
        );

        Ok(outcome)
    }
}
