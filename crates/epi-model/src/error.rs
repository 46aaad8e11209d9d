//! Error types for the cohort regression pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::results::ModelType;

/// Problems found while loading or validating the configuration documents.
///
/// Missing keys and placeholders are collected and reported together so an
/// operator can fix every finding in one pass.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid YAML.
    #[error("invalid yaml at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Configuration root is a scalar or sequence.
    #[error("invalid yaml at {path}: root should be a mapping")]
    NotAMapping { path: PathBuf },

    /// Required keys are absent.
    #[error("project config missing key: {}", .keys.join(", "))]
    MissingKeys { keys: Vec<String> },

    /// `analysis.outcome.type` is not a recognized outcome family.
    #[error("analysis.outcome.type must be one of continuous|binary|survival, got '{value}'")]
    InvalidOutcomeType { value: String },

    /// Survival outcome without usable time/event columns.
    #[error("survival outcome needs valid {}", .keys.join(", "))]
    InvalidSurvivalColumns { keys: Vec<String> },

    /// Unfilled template values remain.
    #[error("please replace placeholders before running:\n - {}", .paths.join("\n - "))]
    Placeholders { paths: Vec<String> },

    /// `analysis.options.dropna_strategy` is not recognized.
    #[error("unsupported dropna strategy: {value}")]
    UnsupportedStrategy { value: String },

    /// A value has the wrong shape or an impossible setting.
    #[error("invalid {document} config: {message}")]
    Invalid { document: String, message: String },
}

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The analysis cohort is smaller than `analysis.options.min_rows`.
    #[error("rows after filtering ({observed}) < min_rows ({required})")]
    InsufficientData { observed: usize, required: usize },

    /// The exposure term is missing from a fitted model's output.
    #[error("exposure {term} not found in {model_type} model output")]
    TermNotFound { model_type: ModelType, term: String },

    /// Dataset format outside csv, tsv and parquet.
    #[error("unsupported data format: {format}")]
    UnsupportedFormat { format: String },

    /// A configured column does not exist in the dataset.
    #[error("column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// A model or clipping column does not hold numbers.
    #[error("column '{column}' is not numeric (dtype {dtype})")]
    NonNumericColumn { column: String, dtype: String },

    /// The outcome column holds values the model family cannot use.
    #[error("invalid outcome column '{column}': {reason}")]
    InvalidOutcome { column: String, reason: String },

    /// The numerical fit failed.
    #[error("{model_type} model for exposure '{exposure}' failed: {source}")]
    Fit {
        model_type: ModelType,
        exposure: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    /// File system failure while reading inputs or writing artifacts.
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize run metadata: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<polars::prelude::PolarsError> for PipelineError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_are_listed_together() {
        let err = ConfigError::MissingKeys {
            keys: vec!["data".to_string(), "output".to_string()],
        };
        assert_eq!(err.to_string(), "project config missing key: data, output");
    }

    #[test]
    fn placeholders_are_one_per_line() {
        let err = ConfigError::Placeholders {
            paths: vec!["data.input_path".to_string(), "fields.rename_map.a".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "please replace placeholders before running:\n - data.input_path\n - fields.rename_map.a"
        );
    }

    #[test]
    fn insufficient_data_carries_counts() {
        let err = PipelineError::InsufficientData {
            observed: 12,
            required: 30,
        };
        assert_eq!(err.to_string(), "rows after filtering (12) < min_rows (30)");
    }

    #[test]
    fn polars_errors_convert() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("x".into());
        let err: PipelineError = polars_err.into();
        assert!(matches!(err, PipelineError::DataFrame { .. }));
    }
}
