//! Error types for the cleaning pipeline.
//!
//! Fatal conditions (schema mismatch, undefined median, sink failures) are
//! modelled as [`PipelineError`] variants. Per-cell problems such as a
//! malformed time or an unknown category never surface here; the pipeline
//! absorbs them into missing/sentinel values.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A targeted column is absent from the input table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A column needed for median imputation has no present values.
    #[error("Column '{0}' has no present values, median is undefined")]
    AllMissing(String),

    /// A column being normalized has max == min.
    #[error("Column '{0}' has zero variance (max == min), cannot normalize")]
    DegenerateRange(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The target spreadsheet could not be located.
    #[error("Spreadsheet '{0}' not found")]
    SpreadsheetNotFound(String),

    /// The spreadsheet service rejected a request.
    #[error("Spreadsheet request failed with status {status}: {message}")]
    Sheets { status: u16, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// HTTP transport error (only with the "sheets" feature).
    #[cfg(feature = "sheets")]
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, preserved through context wrapping.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::AllMissing(_) => "ALL_MISSING",
            Self::DegenerateRange(_) => "DEGENERATE_RANGE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::SpreadsheetNotFound(_) => "SPREADSHEET_NOT_FOUND",
            Self::Sheets { .. } => "SHEETS_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Csv(_) => "CSV_ERROR",
            #[cfg(feature = "sheets")]
            Self::HttpRequest(_) => "HTTP_REQUEST_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// The innermost error, with all context layers removed.
    pub fn root(&self) -> &PipelineError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the error means the input table does not match the expected schema.
    pub fn is_schema_error(&self) -> bool {
        matches!(self.root(), Self::ColumnNotFound(_))
    }
}

impl From<crate::config::ConfigValidationError> for PipelineError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        PipelineError::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as `{ code, message }` for the JSON run report.
impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}
