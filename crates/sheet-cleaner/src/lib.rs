//! Spreadsheet Cleaning Pipeline Library
//!
//! A small, strictly linear data-cleaning pipeline built with Rust and Polars.
//!
//! # Overview
//!
//! A survey table (age, average salary, trip start/end times, education) is
//! loaded from CSV, cleaned, and published to a spreadsheet:
//!
//! - **Imputation**: missing Age and Average Salary values are filled with the
//!   column median
//! - **Row Discarding**: rows that still hold a missing value are dropped
//! - **Normalization**: numeric columns and converted trip times are min-max
//!   scaled to [0, 1]
//! - **Time Conversion**: "HH:MM" strings become minutes since midnight
//! - **Encoding**: education labels are mapped through a lookup table
//! - **Metrics**: percentages of modified cells and discarded rows
//! - **Publishing**: the worksheet is cleared, then rewritten with the table
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sheet_cleaner::{Pipeline, PipelineConfig, load_csv};
//! use sheet_cleaner::sinks::{CsvFileSink, FileLineSink};
//! use std::sync::Arc;
//!
//! let df = load_csv("data_student_24732.csv")?;
//!
//! let pipeline = Pipeline::builder()
//!     .config(PipelineConfig::default())
//!     .operational_log(Arc::new(FileLineSink::new("log.txt")))
//!     .report_log(Arc::new(FileLineSink::new("report.txt")))
//!     .build()?;
//!
//! let result = pipeline.process(df)?;
//! println!("Modified: {:.2}%", result.report.modified_percentage);
//!
//! pipeline.publish(&result, &mut CsvFileSink::new("cleaned.csv"))?;
//! ```
//!
//! # Configuration
//!
//! Use [`PipelineConfig`] to rename the targeted columns or change the
//! education lookup table:
//!
//! ```rust,ignore
//! use sheet_cleaner::config::*;
//!
//! let config = PipelineConfig::builder()
//!     .age_column("Age")
//!     .education_column("Education")
//!     .category_mapping(CategoryMapping::new([("Primary", 0), ("Secondary", 1), ("Higher", 2)]))
//!     .degenerate_range(DegenerateRangePolicy::Fail)
//!     .build()?;
//! ```
//!
//! # Sinks
//!
//! Logs and the publishing target are passed in as sink objects; see the
//! [`sinks`] module. The Google Sheets sink is behind the `sheets` feature
//! (enabled by default).

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod quality;
pub mod reporting;
pub mod sinks;
pub mod transforms;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{RowDiscarder, TimeConversion, convert_time_column, parse_time_of_day};
pub use config::{
    CategoryMapping, ColumnRoles, ConfigValidationError, DegenerateRangePolicy, PipelineConfig,
    PipelineConfigBuilder,
};
pub use error::{PipelineError, ResultExt};
pub use imputers::{ImputationOutcome, MedianImputer};
pub use loader::{load_csv, load_csv_str};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineStage, publish_table};
pub use quality::{QualityMetrics, QualityReport, StageTally};
pub use reporting::{ReportGenerator, RunReport};
pub use transforms::{CategoryEncoder, MinMaxNormalizer};
pub use types::PipelineResult;
pub use sinks::SheetCell;
pub use utils::table_to_rows;
