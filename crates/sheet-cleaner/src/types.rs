use crate::quality::QualityReport;
use polars::prelude::DataFrame;

/// Output of a successful [`crate::Pipeline::process`] run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// The cleaned table, ready to publish.
    pub data: DataFrame,
    /// Finalized quality metrics.
    pub report: QualityReport,
    /// Human-readable description of each step taken, in order.
    pub processing_steps: Vec<String>,
}

impl PipelineResult {
    /// (rows, columns) of the cleaned table.
    pub fn shape(&self) -> (usize, usize) {
        self.data.shape()
    }
}
