//! Run report generation.
//!
//! The operational and report logs are written by the pipeline itself
//! (see [`crate::sinks`]). This module adds an optional machine-readable
//! summary of a run, written as pretty JSON next to the input
//! (`--emit-report` CLI flag).
//!
//! # Example
//!
//! ```rust,ignore
//! use sheet_cleaner::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_run_report(
//!     "data_student_24732.csv",
//!     Some("ASILab02"),
//!     original_shape,
//!     &pipeline_result,
//! );
//!
//! let generator = ReportGenerator::new(PathBuf::from("."));
//! generator.write_report_to_file(&report, "data_student_24732")?;
//! ```

mod generator;

pub use generator::{ReportGenerator, RunReport, StageSummary};
