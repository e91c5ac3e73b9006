//! Main cleaning pipeline.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the cleaning workflow and publishing its output.

use crate::cleaner::{RowDiscarder, convert_time_column};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result, ResultExt};
use crate::imputers::MedianImputer;
use crate::pipeline::PipelineStage;
use crate::quality::QualityMetrics;
use crate::sinks::{LineSink, NullLineSink, OperationalLog, ReportLog, SpreadsheetSink};
use crate::transforms::{CategoryEncoder, MinMaxNormalizer};
use crate::types::PipelineResult;
use crate::utils::table_to_rows;
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// The cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a pipeline with custom configuration
/// and log sinks.
///
/// # Example
///
/// ```rust,ignore
/// use sheet_cleaner::{Pipeline, PipelineConfig};
/// use sheet_cleaner::sinks::{CsvFileSink, FileLineSink};
/// use std::sync::Arc;
///
/// let pipeline = Pipeline::builder()
///     .config(PipelineConfig::default())
///     .operational_log(Arc::new(FileLineSink::new("log.txt")))
///     .report_log(Arc::new(FileLineSink::new("report.txt")))
///     .build()?;
///
/// let result = pipeline.process(df)?;
/// pipeline.publish(&result, &mut CsvFileSink::new("cleaned.csv"))?;
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    oplog: OperationalLog,
    report_log: ReportLog,
    normalizer: MinMaxNormalizer,
}

// Ensure Pipeline is Send (can be moved to another thread)
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every cleaning stage over `df`.
    ///
    /// On success the report log has received its two percentage lines. On
    /// failure an error line is written to the operational log and nothing is
    /// written to the report log.
    ///
    /// # Errors
    ///
    /// The error is wrapped with the name of the stage that raised it. Schema
    /// errors ([`PipelineError::ColumnNotFound`]) are raised before any stage
    /// touches the table.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        match self.process_internal(df) {
            Ok(result) => Ok(result),
            Err(e) => {
                error!("Pipeline error: {}", e);
                if let Err(log_err) = self.oplog.error(format!("Pipeline failed: {}", e)) {
                    warn!("Could not write to operational log: {}", log_err);
                }
                Err(e)
            }
        }
    }

    fn process_internal(&self, mut df: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let columns = &self.config.columns;
        let mut steps: Vec<String> = Vec::new();

        self.oplog.info(format!(
            "Starting cleaning pipeline: {} rows x {} columns",
            df.height(),
            df.width()
        ))?;

        // ---------------------------------------------------------------------
        // Schema check
        // ---------------------------------------------------------------------
        self.check_schema(&df)
            .context(PipelineStage::SchemaCheck.error_context())?;

        let mut metrics = QualityMetrics::start(&df);

        // ---------------------------------------------------------------------
        // Median imputation
        // ---------------------------------------------------------------------
        let imputations = [
            (PipelineStage::ImputeAge, columns.age.as_str()),
            (PipelineStage::ImputeSalary, columns.average_salary.as_str()),
        ];
        for (stage, col_name) in imputations {
            let outcome =
                MedianImputer::impute(&mut df, col_name).context(stage.error_context())?;
            metrics.record_modified(stage, col_name, outcome.filled);

            let message = match outcome.median {
                Some(median) => {
                    metrics.record_median(col_name, median);
                    format!(
                        "Imputed {} missing values in '{}' with median {}",
                        outcome.filled, col_name, median
                    )
                }
                None => format!("Column '{}' is empty, nothing to impute", col_name),
            };
            self.log_step(&mut steps, message)?;
        }

        // ---------------------------------------------------------------------
        // Discard incomplete rows
        // ---------------------------------------------------------------------
        let stage = PipelineStage::DiscardIncomplete;
        let discarded = RowDiscarder::discard_incomplete(&mut df).context(stage.error_context())?;
        metrics.record_discarded(stage, discarded);
        self.log_step(
            &mut steps,
            format!(
                "Discarded {} rows with missing values ({} rows remain)",
                discarded,
                df.height()
            ),
        )?;

        // ---------------------------------------------------------------------
        // Normalize numeric columns
        // ---------------------------------------------------------------------
        for col_name in columns.numeric() {
            self.normalize_column(
                &mut df,
                col_name,
                PipelineStage::NormalizeNumeric,
                &mut metrics,
                &mut steps,
            )?;
        }

        // ---------------------------------------------------------------------
        // Convert and normalize trip times
        // ---------------------------------------------------------------------
        let stage = PipelineStage::ConvertTripTimes;
        let trip_columns = columns.trip_times();
        for col_name in trip_columns {
            let conversion = convert_time_column(&mut df, col_name).context(stage.error_context())?;
            if conversion.malformed > 0 {
                self.oplog.warn(format!(
                    "Found {} malformed time values in '{}', treated as missing",
                    conversion.malformed, col_name
                ))?;
            }
            self.log_step(
                &mut steps,
                format!(
                    "Converted {} time values in '{}' to minutes since midnight",
                    conversion.converted, col_name
                ),
            )?;
        }

        let discarded = RowDiscarder::discard_missing_in(&mut df, &trip_columns)
            .context(stage.error_context())?;
        metrics.record_discarded(stage, discarded);
        if discarded > 0 {
            self.log_step(
                &mut steps,
                format!(
                    "Discarded {} rows without a valid trip time ({} rows remain)",
                    discarded,
                    df.height()
                ),
            )?;
        }

        for col_name in trip_columns {
            self.normalize_column(&mut df, col_name, stage, &mut metrics, &mut steps)?;
        }

        // ---------------------------------------------------------------------
        // Encode education
        // ---------------------------------------------------------------------
        let stage = PipelineStage::EncodeEducation;
        let encoder = CategoryEncoder::new(
            &self.config.category_mapping,
            self.config.unknown_category_code,
        );
        let encoding = encoder
            .encode_column(&mut df, &columns.education)
            .context(stage.error_context())?;
        metrics.record_modified(stage, &columns.education, encoding.written);
        if encoding.unknown > 0 {
            self.oplog.warn(format!(
                "Found {} unknown labels in '{}', encoded as {}",
                encoding.unknown, columns.education, self.config.unknown_category_code
            ))?;
        }
        self.log_step(
            &mut steps,
            format!(
                "Encoded {} values in '{}'",
                encoding.written, columns.education
            ),
        )?;

        // ---------------------------------------------------------------------
        // Metrics
        // ---------------------------------------------------------------------
        let report = metrics.finalize(df.height());
        self.report_log
            .write_report(&report)
            .context(PipelineStage::Metrics.error_context())?;
        self.oplog.info(format!(
            "Cleaning finished in {:.2?}: {:.2}% cells modified, {:.2}% rows discarded",
            start_time.elapsed(),
            report.modified_percentage,
            report.discarded_percentage
        ))?;

        Ok(PipelineResult {
            data: df,
            report,
            processing_steps: steps,
        })
    }

    /// Publish a cleaned table: clear the worksheet, then write header and rows.
    ///
    /// Returns the number of data rows written (header excluded).
    pub fn publish(
        &self,
        result: &PipelineResult,
        sink: &mut dyn SpreadsheetSink,
    ) -> Result<usize> {
        let stage = PipelineStage::Publish;
        match publish_table(&result.data, sink).context(stage.error_context()) {
            Ok(written) => {
                self.oplog.info(format!(
                    "Published {} rows to '{}'",
                    written,
                    sink.name()
                ))?;
                Ok(written)
            }
            Err(e) => {
                error!("Publish error: {}", e);
                if let Err(log_err) = self.oplog.error(format!("Publishing failed: {}", e)) {
                    warn!("Could not write to operational log: {}", log_err);
                }
                Err(e)
            }
        }
    }

    fn check_schema(&self, df: &DataFrame) -> Result<()> {
        for (role, col_name) in self.config.columns.with_roles() {
            if df.column(col_name).is_err() {
                debug!("Missing {} column '{}'", role, col_name);
                return Err(PipelineError::ColumnNotFound(col_name.to_string()));
            }
        }
        Ok(())
    }

    fn normalize_column(
        &self,
        df: &mut DataFrame,
        col_name: &str,
        stage: PipelineStage,
        metrics: &mut QualityMetrics,
        steps: &mut Vec<String>,
    ) -> Result<()> {
        let outcome = self
            .normalizer
            .normalize(df, col_name)
            .context(stage.error_context())?;
        metrics.record_modified(stage, col_name, outcome.written);

        if outcome.degenerate {
            self.oplog.warn(format!(
                "Column '{}' has zero variance, all {} values set to 0.0",
                col_name, outcome.written
            ))?;
        }

        let message = match (outcome.min, outcome.max) {
            (Some(min), Some(max)) => format!(
                "Normalized {} values in '{}' (min {}, max {})",
                outcome.written, col_name, min, max
            ),
            _ => format!("Column '{}' has no values to normalize", col_name),
        };
        self.log_step(steps, message)
    }

    fn log_step(&self, steps: &mut Vec<String>, message: String) -> Result<()> {
        self.oplog.info(&message)?;
        steps.push(message);
        Ok(())
    }
}

/// Replace a sink's contents with `df`: `clear`, then one `write_rows` call
/// holding the header row followed by every record.
///
/// Returns the number of data rows written.
pub fn publish_table(df: &DataFrame, sink: &mut dyn SpreadsheetSink) -> Result<usize> {
    let rows = table_to_rows(df)?;
    sink.clear()?;
    sink.write_rows(&rows)?;
    Ok(rows.len() - 1)
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    operational_log: Option<Arc<dyn LineSink>>,
    report_log: Option<Arc<dyn LineSink>>,
}

// Ensure PipelineBuilder is Send (can be moved to another thread during construction)
static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the sink receiving timestamped operational log lines.
    ///
    /// Defaults to a sink that discards everything.
    pub fn operational_log(mut self, sink: Arc<dyn LineSink>) -> Self {
        self.operational_log = Some(sink);
        self
    }

    /// Set the sink receiving the two final percentage lines.
    ///
    /// Defaults to a sink that discards everything.
    pub fn report_log(mut self, sink: Arc<dyn LineSink>) -> Self {
        self.report_log = Some(sink);
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> std::result::Result<Pipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let operational_log = self
            .operational_log
            .unwrap_or_else(|| Arc::new(NullLineSink));
        let report_log = self.report_log.unwrap_or_else(|| Arc::new(NullLineSink));

        Ok(Pipeline {
            normalizer: MinMaxNormalizer::new(config.degenerate_range),
            config,
            oplog: OperationalLog::new(operational_log),
            report_log: ReportLog::new(report_log),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DegenerateRangePolicy;
    use crate::sinks::{MemoryLineSink, MemorySheetSink, SheetCall, SheetCell};

    fn small_config() -> PipelineConfig {
        PipelineConfig::builder()
            .age_column("age")
            .average_salary_column("salary")
            .trip_start_column("start")
            .trip_end_column("end")
            .education_column("edu")
            .build()
            .unwrap()
    }

    fn small_frame() -> DataFrame {
        df![
            "age" => [Some(20.0), None, Some(40.0)],
            "salary" => [Some(1000.0), Some(3000.0), None],
            "start" => ["08:00", "09:00", "10:00"],
            "end" => ["16:00", "17:00", "18:00"],
            "edu" => ["Podstawowe", "Średnie", "Wyższe"],
        ]
        .unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config().columns.age, "Wiek");
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.columns.education = config.columns.age.clone();

        assert!(Pipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_process_small_table() {
        let oplog = Arc::new(MemoryLineSink::new());
        let report = Arc::new(MemoryLineSink::new());
        let pipeline = Pipeline::builder()
            .config(small_config())
            .operational_log(oplog.clone())
            .report_log(report.clone())
            .build()
            .unwrap();

        let result = pipeline.process(small_frame()).unwrap();

        assert_eq!(result.shape(), (3, 5));
        assert_eq!(result.report.metrics.discarded_rows, 0);
        assert_eq!(result.report.metrics.medians.get("age"), Some(&30.0));
        assert_eq!(result.report.metrics.medians.get("salary"), Some(&2000.0));
        // 2 imputed + 4 * 3 normalized + 3 encoded
        assert_eq!(result.report.metrics.modified_cells, 17);
        assert_eq!(report.lines().len(), 2);
        assert!(oplog.lines().iter().any(|l| l.contains("median 30")));
        assert_eq!(result.processing_steps.len(), 10);
    }

    #[test]
    fn test_schema_error_names_column_and_stage() {
        let oplog = Arc::new(MemoryLineSink::new());
        let report = Arc::new(MemoryLineSink::new());
        let pipeline = Pipeline::builder()
            .config(small_config())
            .operational_log(oplog.clone())
            .report_log(report.clone())
            .build()
            .unwrap();
        let df = small_frame().drop("edu").unwrap();

        let err = pipeline.process(df).unwrap_err();

        assert!(err.is_schema_error());
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        let message = err.to_string();
        assert!(message.contains("Checking Schema"));
        assert!(message.contains("'edu'"));
        assert!(report.lines().is_empty());
        assert!(oplog.lines().last().unwrap().contains(" - ERROR - "));
    }

    #[test]
    fn test_degenerate_policy_fail() {
        let config = PipelineConfig::builder()
            .age_column("age")
            .average_salary_column("salary")
            .trip_start_column("start")
            .trip_end_column("end")
            .education_column("edu")
            .degenerate_range(DegenerateRangePolicy::Fail)
            .build()
            .unwrap();
        let pipeline = Pipeline::builder().config(config).build().unwrap();
        let df = df![
            "age" => [30.0, 30.0],
            "salary" => [1000.0, 2000.0],
            "start" => ["08:00", "09:00"],
            "end" => ["16:00", "17:00"],
            "edu" => ["Podstawowe", "Wyższe"],
        ]
        .unwrap();

        let err = pipeline.process(df).unwrap_err();

        assert_eq!(err.error_code(), "DEGENERATE_RANGE");
        assert!(err.to_string().contains("Normalizing Numeric Columns"));
    }

    #[test]
    fn test_publish_clears_then_writes() {
        let pipeline = Pipeline::builder().config(small_config()).build().unwrap();
        let result = pipeline.process(small_frame()).unwrap();
        let mut sink = MemorySheetSink::new("test");

        let written = pipeline.publish(&result, &mut sink).unwrap();

        assert_eq!(written, 3);
        assert_eq!(sink.calls().len(), 2);
        assert_eq!(sink.calls()[0], SheetCall::Clear);
        match &sink.calls()[1] {
            SheetCall::Write(rows) => {
                assert_eq!(rows.len(), 4);
                let header: Vec<SheetCell> = ["age", "salary", "start", "end", "edu"]
                    .into_iter()
                    .map(SheetCell::text)
                    .collect();
                assert_eq!(rows[0], header);
                // Row 2: age 40 is the max, salary imputed to the median 2000
                assert_eq!(
                    rows[3],
                    vec![
                        SheetCell::Number(1.0),
                        SheetCell::Number(0.5),
                        SheetCell::Number(1.0),
                        SheetCell::Number(1.0),
                        SheetCell::Integer(2),
                    ]
                );
            }
            other => panic!("expected a write, got {:?}", other),
        }
    }

    #[test]
    fn test_process_zero_row_table() {
        let report = Arc::new(MemoryLineSink::new());
        let pipeline = Pipeline::builder()
            .config(small_config())
            .report_log(report.clone())
            .build()
            .unwrap();
        let df = df![
            "age" => Vec::<f64>::new(),
            "salary" => Vec::<f64>::new(),
            "start" => Vec::<&str>::new(),
            "end" => Vec::<&str>::new(),
            "edu" => Vec::<&str>::new(),
        ]
        .unwrap();

        let result = pipeline.process(df).unwrap();

        assert_eq!(result.shape(), (0, 5));
        assert_eq!(result.report.modified_percentage, 0.0);
        assert_eq!(result.report.discarded_percentage, 0.0);
        assert_eq!(
            report.lines(),
            vec![
                "Modified cells (imputed, normalized or encoded): 0.00%",
                "Discarded rows: 0.00%",
            ]
        );

        let mut sink = MemorySheetSink::new("empty");
        assert_eq!(pipeline.publish(&result, &mut sink).unwrap(), 0);
        assert_eq!(sink.contents().len(), 1);
    }

    #[test]
    fn test_publish_table_empty_frame() {
        let df = df!["a" => Vec::<f64>::new()].unwrap();
        let mut sink = MemorySheetSink::new("empty");

        let written = publish_table(&df, &mut sink).unwrap();

        assert_eq!(written, 0);
        assert_eq!(sink.contents(), &[vec![SheetCell::text("a")]]);
    }
}
