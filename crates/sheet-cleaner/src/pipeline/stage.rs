//! Pipeline stages.
//!
//! The cleaning pipeline is a strictly linear sequence; each stage mutates
//! the table before handing it to the next. Stage names appear in log lines
//! and in the context of fatal errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Verifying that every targeted column exists
    SchemaCheck,
    /// Median imputation of the age column
    ImputeAge,
    /// Median imputation of the average salary column
    ImputeSalary,
    /// Removing rows with any missing value
    DiscardIncomplete,
    /// Min-max normalization of age and average salary
    NormalizeNumeric,
    /// "HH:MM" conversion and normalization of trip times
    ConvertTripTimes,
    /// Lookup-table encoding of education
    EncodeEducation,
    /// Final percentage computation
    Metrics,
    /// Replacing the spreadsheet contents
    Publish,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SchemaCheck => "Checking Schema",
            Self::ImputeAge => "Imputing Age",
            Self::ImputeSalary => "Imputing Average Salary",
            Self::DiscardIncomplete => "Discarding Incomplete Rows",
            Self::NormalizeNumeric => "Normalizing Numeric Columns",
            Self::ConvertTripTimes => "Converting Trip Times",
            Self::EncodeEducation => "Encoding Education",
            Self::Metrics => "Computing Metrics",
            Self::Publish => "Publishing",
        }
    }

    /// Context prefix attached to errors raised inside this stage.
    pub fn error_context(&self) -> String {
        format!("Stage '{}'", self.display_name())
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
