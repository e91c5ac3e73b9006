use crate::error::Result;
use crate::pipeline::PipelineStage;
use crate::quality::QualityReport;
use crate::types::PipelineResult;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Machine-readable summary of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    /// Where the cleaned table was published (if it was)
    pub output_target: Option<String>,
    /// Shape at pipeline entry (rows, columns)
    pub original_shape: (usize, usize),
    /// Shape of the cleaned table
    pub final_shape: (usize, usize),
    /// Finalized quality metrics
    pub quality: QualityReport,
    /// Modified cells and discarded rows summed per stage
    pub stages: Vec<StageSummary>,
    /// Processing steps, in order
    pub processing_steps: Vec<String>,
}

/// Per-stage totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSummary {
    pub stage: PipelineStage,
    pub name: String,
    pub modified_cells: usize,
    pub discarded_rows: usize,
}

/// Writes [`RunReport`]s to disk.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Build the summary for a finished run.
    pub fn build_run_report(
        input_file: &str,
        output_target: Option<&str>,
        original_shape: (usize, usize),
        result: &PipelineResult,
    ) -> RunReport {
        let mut totals: BTreeMap<PipelineStage, (usize, usize)> = BTreeMap::new();
        for tally in &result.report.metrics.stages {
            let entry = totals.entry(tally.stage).or_default();
            entry.0 += tally.modified_cells;
            entry.1 += tally.discarded_rows;
        }

        let stages = totals
            .into_iter()
            .map(|(stage, (modified_cells, discarded_rows))| StageSummary {
                stage,
                name: stage.display_name().to_string(),
                modified_cells,
                discarded_rows,
            })
            .collect();

        RunReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            output_target: output_target.map(String::from),
            original_shape,
            final_shape: result.shape(),
            quality: result.report.clone(),
            stages,
            processing_steps: result.processing_steps.clone(),
        }
    }

    /// Write the report as `<base_name>_report.json` in the output directory.
    pub fn write_report_to_file(&self, report: &RunReport, report_base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::QualityMetrics;
    use polars::prelude::*;

    fn sample_result() -> PipelineResult {
        let entry = df!["a" => [1.0, 2.0, 3.0, 4.0], "b" => [1, 2, 3, 4]].unwrap();
        let mut metrics = QualityMetrics::start(&entry);
        metrics.record_modified(PipelineStage::ImputeAge, "a", 1);
        metrics.record_discarded(PipelineStage::DiscardIncomplete, 1);
        metrics.record_modified(PipelineStage::NormalizeNumeric, "a", 3);
        metrics.record_modified(PipelineStage::NormalizeNumeric, "b", 3);

        PipelineResult {
            data: df!["a" => [0.0, 0.5, 1.0], "b" => [0.0, 0.5, 1.0]].unwrap(),
            report: metrics.finalize(3),
            processing_steps: vec!["step one".to_string()],
        }
    }

    #[test]
    fn test_build_run_report_sums_per_stage() {
        let report =
            ReportGenerator::build_run_report("in.csv", Some("ASILab02"), (4, 2), &sample_result());

        assert_eq!(report.original_shape, (4, 2));
        assert_eq!(report.final_shape, (3, 2));
        assert_eq!(report.stages.len(), 3);
        let normalize = report
            .stages
            .iter()
            .find(|s| s.stage == PipelineStage::NormalizeNumeric)
            .unwrap();
        assert_eq!(normalize.modified_cells, 6);
        assert_eq!(report.quality.discarded_percentage, 25.0);
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ReportGenerator::new(dir.path().join("reports"));
        let report = ReportGenerator::build_run_report("in.csv", None, (4, 2), &sample_result());

        let path = generator.write_report_to_file(&report, "in").unwrap();

        assert!(path.ends_with("reports/in_report.json"));
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["input_file"], "in.csv");
        assert_eq!(json["quality"]["discarded_percentage"], 25.0);
        assert_eq!(json["quality"]["total_rows"], 4);
        assert_eq!(json["stages"][0]["stage"], "impute_age");
    }
}
