//! Min-max normalization.

use crate::config::DegenerateRangePolicy;
use crate::error::{PipelineError, Result};
use crate::utils::{require_series, to_float_series};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of normalizing one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationOutcome {
    pub column: String,
    /// Column minimum before scaling, `None` if no value was present.
    pub min: Option<f64>,
    /// Column maximum before scaling, `None` if no value was present.
    pub max: Option<f64>,
    /// Non-missing values written.
    pub written: usize,
    /// Whether max == min and the fallback was applied.
    pub degenerate: bool,
}

/// Rescales a numeric column with `(v - min) / (max - min)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinMaxNormalizer {
    policy: DegenerateRangePolicy,
}

impl MinMaxNormalizer {
    pub fn new(policy: DegenerateRangePolicy) -> Self {
        Self { policy }
    }

    /// Normalize a column in place, casting it to Float64.
    ///
    /// Missing cells stay missing. When every present value is equal, the
    /// configured [`DegenerateRangePolicy`] decides the outcome.
    pub fn normalize(&self, df: &mut DataFrame, col_name: &str) -> Result<NormalizationOutcome> {
        let series = to_float_series(require_series(df, col_name)?)?;
        let values = series.f64()?;
        let written = values.len() - values.null_count();

        let (Some(min), Some(max)) = (values.min(), values.max()) else {
            return Ok(NormalizationOutcome {
                column: col_name.to_string(),
                min: None,
                max: None,
                written: 0,
                degenerate: false,
            });
        };

        let degenerate = max == min;
        let scaled = if degenerate {
            match self.policy {
                DegenerateRangePolicy::Zero => values.apply(|v| v.map(|_| 0.0)),
                DegenerateRangePolicy::Fail => {
                    return Err(PipelineError::DegenerateRange(col_name.to_string()));
                }
            }
        } else {
            let range = max - min;
            if range.is_finite() {
                values.apply(|v| v.map(|val| (val - min) / range))
            } else {
                // Span exceeds f64::MAX; halving keeps every term finite
                let half_range = max / 2.0 - min / 2.0;
                values.apply(|v| v.map(|val| (val / 2.0 - min / 2.0) / half_range))
            }
        };

        df.replace(col_name, scaled.into_series())?;
        debug!(
            "Normalized '{}' over [{}, {}] ({} values)",
            col_name, min, max, written
        );

        Ok(NormalizationOutcome {
            column: col_name.to_string(),
            min: Some(min),
            max: Some(max),
            written,
            degenerate,
        })
    }
}
