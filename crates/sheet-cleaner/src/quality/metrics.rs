//! Quality metrics accumulated across pipeline stages.

use crate::pipeline::PipelineStage;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts contributed by one stage for one column (or the whole table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTally {
    pub stage: PipelineStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub modified_cells: usize,
    pub discarded_rows: usize,
}

/// Running totals, created at pipeline entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Row count at pipeline entry
    pub total_rows: usize,
    /// Cell count (rows x columns) at pipeline entry
    pub total_cells: usize,
    /// Cells imputed, normalized or encoded
    pub modified_cells: usize,
    /// Rows removed for missing values
    pub discarded_rows: usize,
    /// Per-stage breakdown, in the order recorded
    pub stages: Vec<StageTally>,
    /// Medians used for imputation, by column
    pub medians: BTreeMap<String, f64>,
}

impl QualityMetrics {
    /// Start accounting for a table as it enters the pipeline.
    pub fn start(df: &DataFrame) -> Self {
        Self {
            total_rows: df.height(),
            total_cells: df.height() * df.width(),
            ..Self::default()
        }
    }

    /// Record cells modified by a stage in one column.
    pub fn record_modified(&mut self, stage: PipelineStage, column: &str, cells: usize) {
        self.modified_cells += cells;
        self.stages.push(StageTally {
            stage,
            column: Some(column.to_string()),
            modified_cells: cells,
            discarded_rows: 0,
        });
    }

    /// Record rows discarded by a stage.
    pub fn record_discarded(&mut self, stage: PipelineStage, rows: usize) {
        self.discarded_rows += rows;
        self.stages.push(StageTally {
            stage,
            column: None,
            modified_cells: 0,
            discarded_rows: rows,
        });
    }

    pub fn record_median(&mut self, column: &str, median: f64) {
        self.medians.insert(column.to_string(), median);
    }

    /// Compute the final percentages.
    pub fn finalize(self, rows_after: usize) -> QualityReport {
        QualityReport {
            modified_percentage: percentage(self.modified_cells, self.total_cells),
            discarded_percentage: percentage(self.discarded_rows, self.total_rows),
            rows_after,
            metrics: self,
        }
    }
}

/// Finalized metrics for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// `100 * modified_cells / total_cells`, capped at 100
    pub modified_percentage: f64,
    /// `100 * discarded_rows / total_rows`
    pub discarded_percentage: f64,
    /// Row count of the cleaned table
    pub rows_after: usize,
    #[serde(flatten)]
    pub metrics: QualityMetrics,
}

/// `100 * part / whole` in [0, 100]; 0 when `whole` is 0.
///
/// The modified-cell tally counts a cell once per stage that writes it
/// (imputed, then normalized), so the ratio is capped.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (100.0 * part as f64 / whole as f64).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(0, 10), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(30, 20), 100.0);
    }

    #[test]
    fn test_start_counts_entry_shape() {
        let df = df!["a" => [1, 2, 3], "b" => ["x", "y", "z"]].unwrap();
        let metrics = QualityMetrics::start(&df);
        assert_eq!(metrics.total_rows, 3);
        assert_eq!(metrics.total_cells, 6);
        assert_eq!(metrics.modified_cells, 0);
    }

    #[test]
    fn test_finalize() {
        let df = df!["a" => [1, 2, 3, 4], "b" => [1, 2, 3, 4]].unwrap();
        let mut metrics = QualityMetrics::start(&df);
        metrics.record_modified(PipelineStage::ImputeAge, "a", 1);
        metrics.record_modified(PipelineStage::NormalizeNumeric, "a", 3);
        metrics.record_discarded(PipelineStage::DiscardIncomplete, 1);
        metrics.record_median("a", 2.5);

        let report = metrics.finalize(3);

        assert_eq!(report.modified_percentage, 50.0);
        assert_eq!(report.discarded_percentage, 25.0);
        assert_eq!(report.rows_after, 3);
        assert_eq!(report.metrics.stages.len(), 3);
        assert_eq!(report.metrics.medians.get("a"), Some(&2.5));
    }

    #[test]
    fn test_finalize_empty_table() {
        let df = DataFrame::empty();
        let report = QualityMetrics::start(&df).finalize(0);
        assert_eq!(report.modified_percentage, 0.0);
        assert_eq!(report.discarded_percentage, 0.0);
    }
}
