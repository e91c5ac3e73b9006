//! Imputation module for handling missing values.
//!
//! The pipeline fills missing numeric cells with the column median.

mod median;

pub use median::{ImputationOutcome, MedianImputer};
