//! Data-quality accounting.
//!
//! [`QualityMetrics`] accumulates counts while the pipeline runs and is
//! finalized into a [`QualityReport`] holding the two published percentages.

mod metrics;

pub use metrics::{QualityMetrics, QualityReport, StageTally, percentage};
