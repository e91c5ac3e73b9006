//! Configuration types for the cleaning pipeline.
//!
//! The pipeline works on a fixed set of targeted columns. Their literal names
//! and the education lookup table are configuration rather than code, so the
//! same pipeline can run against a dataset with differently labelled columns.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default input file for a run.
pub const DEFAULT_INPUT_FILE: &str = "data_student_24732.csv";

/// Default name of the target spreadsheet.
pub const DEFAULT_SPREADSHEET: &str = "ASILab02";

/// Default path of the operational log.
pub const DEFAULT_LOG_FILE: &str = "log.txt";

/// Default path of the report log.
pub const DEFAULT_REPORT_FILE: &str = "report.txt";

/// Code assigned to education labels missing from the lookup table.
pub const DEFAULT_UNKNOWN_CATEGORY_CODE: i64 = -1;

/// Literal column names for each targeted role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnRoles {
    /// Age, numeric.
    pub age: String,
    /// Average salary, numeric.
    pub average_salary: String,
    /// Trip start, "HH:MM".
    pub trip_start_time: String,
    /// Trip end, "HH:MM".
    pub trip_end_time: String,
    /// Education level, categorical.
    pub education: String,
}

impl Default for ColumnRoles {
    fn default() -> Self {
        Self {
            age: "Wiek".to_string(),
            average_salary: "Średnie Zarobki".to_string(),
            trip_start_time: "Czas Początkowy Podróży".to_string(),
            trip_end_time: "Czas Końcowy Podróży".to_string(),
            education: "Wykształcenie".to_string(),
        }
    }
}

impl ColumnRoles {
    /// All targeted columns paired with a role label, in pipeline order.
    pub fn with_roles(&self) -> [(&'static str, &str); 5] {
        [
            ("age", self.age.as_str()),
            ("average_salary", self.average_salary.as_str()),
            ("trip_start_time", self.trip_start_time.as_str()),
            ("trip_end_time", self.trip_end_time.as_str()),
            ("education", self.education.as_str()),
        ]
    }

    /// Columns that are median-imputed and min-max normalized.
    pub fn numeric(&self) -> [&str; 2] {
        [self.age.as_str(), self.average_salary.as_str()]
    }

    /// Columns holding "HH:MM" times.
    pub fn trip_times(&self) -> [&str; 2] {
        [self.trip_start_time.as_str(), self.trip_end_time.as_str()]
    }
}

/// Ordered lookup table from category label to integer code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMapping {
    entries: Vec<(String, i64)>,
}

impl Default for CategoryMapping {
    /// Education levels: basic, secondary, higher.
    fn default() -> Self {
        Self::new([("Podstawowe", 0), ("Średnie", 1), ("Wyższe", 2)])
    }
}

impl CategoryMapping {
    /// Build a mapping from `(label, code)` pairs.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(label, code)| (label.into(), code))
                .collect(),
        }
    }

    /// Code for an exact label match.
    pub fn code_for(&self, label: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(known, _)| known == label)
            .map(|(_, code)| *code)
    }

    pub fn entries(&self) -> &[(String, i64)] {
        &self.entries
    }
}

/// What to do when a column being normalized has max == min.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateRangePolicy {
    /// Map every present value to 0.0
    #[default]
    Zero,
    /// Abort the run with a `DegenerateRange` error
    Fail,
}

/// Configuration for the cleaning pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use sheet_cleaner::config::{DegenerateRangePolicy, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .age_column("Age")
///     .degenerate_range(DegenerateRangePolicy::Fail)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Names of the targeted columns.
    pub columns: ColumnRoles,

    /// Education label lookup table.
    /// Default: Podstawowe → 0, Średnie → 1, Wyższe → 2
    pub category_mapping: CategoryMapping,

    /// Code written for labels missing from `category_mapping`.
    /// Default: -1
    pub unknown_category_code: i64,

    /// Handling of zero-variance columns during normalization.
    /// Default: Zero
    pub degenerate_range: DegenerateRangePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            columns: ColumnRoles::default(),
            category_mapping: CategoryMapping::default(),
            unknown_category_code: DEFAULT_UNKNOWN_CATEGORY_CODE,
            degenerate_range: DegenerateRangePolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Io(e).with_context(format!("Reading config {}", path.display()))
        })?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        let mut seen = HashSet::new();
        for (role, name) in self.columns.with_roles() {
            if name.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName(role.to_string()));
            }
            if !seen.insert(name) {
                return Err(ConfigValidationError::DuplicateColumn(name.to_string()));
            }
        }

        let mut labels = HashSet::new();
        for (label, code) in self.category_mapping.entries() {
            if !labels.insert(label.as_str()) {
                return Err(ConfigValidationError::DuplicateCategory(label.clone()));
            }
            if *code == self.unknown_category_code {
                return Err(ConfigValidationError::SentinelCollision {
                    label: label.clone(),
                    code: *code,
                });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Column name for role '{0}' must not be empty")]
    EmptyColumnName(String),

    #[error("Column '{0}' is assigned to more than one role")]
    DuplicateColumn(String),

    #[error("Category label '{0}' appears more than once")]
    DuplicateCategory(String),

    #[error("Category '{label}' uses code {code}, which is reserved for unknown values")]
    SentinelCollision { label: String, code: i64 },
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    columns: Option<ColumnRoles>,
    age: Option<String>,
    average_salary: Option<String>,
    trip_start_time: Option<String>,
    trip_end_time: Option<String>,
    education: Option<String>,
    category_mapping: Option<CategoryMapping>,
    unknown_category_code: Option<i64>,
    degenerate_range: Option<DegenerateRangePolicy>,
}

impl PipelineConfigBuilder {
    /// Replace all column names at once.
    pub fn columns(mut self, columns: ColumnRoles) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn age_column(mut self, name: impl Into<String>) -> Self {
        self.age = Some(name.into());
        self
    }

    pub fn average_salary_column(mut self, name: impl Into<String>) -> Self {
        self.average_salary = Some(name.into());
        self
    }

    pub fn trip_start_column(mut self, name: impl Into<String>) -> Self {
        self.trip_start_time = Some(name.into());
        self
    }

    pub fn trip_end_column(mut self, name: impl Into<String>) -> Self {
        self.trip_end_time = Some(name.into());
        self
    }

    pub fn education_column(mut self, name: impl Into<String>) -> Self {
        self.education = Some(name.into());
        self
    }

    /// Set the education lookup table.
    pub fn category_mapping(mut self, mapping: CategoryMapping) -> Self {
        self.category_mapping = Some(mapping);
        self
    }

    /// Set the code for labels missing from the lookup table.
    pub fn unknown_category_code(mut self, code: i64) -> Self {
        self.unknown_category_code = Some(code);
        self
    }

    /// Set the zero-variance handling policy.
    pub fn degenerate_range(mut self, policy: DegenerateRangePolicy) -> Self {
        self.degenerate_range = Some(policy);
        self
    }

    /// Build the configuration, validating it.
    pub fn build(self) -> std::result::Result<PipelineConfig, ConfigValidationError> {
        let mut columns = self.columns.unwrap_or_default();
        if let Some(name) = self.age {
            columns.age = name;
        }
        if let Some(name) = self.average_salary {
            columns.average_salary = name;
        }
        if let Some(name) = self.trip_start_time {
            columns.trip_start_time = name;
        }
        if let Some(name) = self.trip_end_time {
            columns.trip_end_time = name;
        }
        if let Some(name) = self.education {
            columns.education = name;
        }

        let config = PipelineConfig {
            columns,
            category_mapping: self.category_mapping.unwrap_or_default(),
            unknown_category_code: self
                .unknown_category_code
                .unwrap_or(DEFAULT_UNKNOWN_CATEGORY_CODE),
            degenerate_range: self.degenerate_range.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
