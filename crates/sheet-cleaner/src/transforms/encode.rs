//! Categorical encoding through a fixed lookup table.

use crate::config::CategoryMapping;
use crate::error::Result;
use crate::utils::require_series;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Result of encoding one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingOutcome {
    pub column: String,
    /// Non-missing codes written.
    pub written: usize,
    /// Labels that fell back to the unknown code.
    pub unknown: usize,
}

/// Maps category labels to integer codes; unlisted labels get the unknown code.
#[derive(Debug, Clone, Copy)]
pub struct CategoryEncoder<'a> {
    mapping: &'a CategoryMapping,
    unknown_code: i64,
}

impl<'a> CategoryEncoder<'a> {
    pub fn new(mapping: &'a CategoryMapping, unknown_code: i64) -> Self {
        Self {
            mapping,
            unknown_code,
        }
    }

    /// Code for a single label. Matching is exact.
    pub fn encode_value(&self, label: &str) -> i64 {
        self.mapping.code_for(label).unwrap_or(self.unknown_code)
    }

    /// Replace a label column with Int64 codes. Missing cells stay missing.
    pub fn encode_column(&self, df: &mut DataFrame, col_name: &str) -> Result<EncodingOutcome> {
        let series = require_series(df, col_name)?.cast(&DataType::String)?;
        let labels = series.str()?;

        let mut unknown = 0;
        let codes: Vec<Option<i64>> = labels
            .into_iter()
            .map(|opt_label| {
                opt_label.map(|label| {
                    let code = self.encode_value(label);
                    // Validated configs reserve the unknown code
                    if code == self.unknown_code {
                        unknown += 1;
                    }
                    code
                })
            })
            .collect();

        let written = codes.iter().filter(|c| c.is_some()).count();
        df.replace(col_name, Series::new(col_name.into(), codes))?;

        Ok(EncodingOutcome {
            column: col_name.to_string(),
            written,
            unknown,
        })
    }
}
