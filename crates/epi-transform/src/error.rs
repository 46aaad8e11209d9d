//! Error types for column cleaning.

use thiserror::Error;

use epi_model::PipelineError;

/// Errors raised by a cleaning step.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A clip or standardization target holds non-numeric values.
    #[error("column '{column}' is not numeric (dtype {dtype})")]
    NonNumericColumn { column: String, dtype: String },

    /// Clip bounds where the lower side exceeds the upper side.
    #[error("numeric_bounds.{column}: lower ({lower}) is greater than upper ({upper})")]
    InvertedBounds {
        column: String,
        lower: f64,
        upper: f64,
    },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

impl From<TransformError> for PipelineError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::NonNumericColumn { column, dtype } => {
                PipelineError::NonNumericColumn { column, dtype }
            }
            TransformError::InvertedBounds { .. } => {
                PipelineError::Config(epi_model::ConfigError::Invalid {
                    document: "fields".to_string(),
                    message: err.to_string(),
                })
            }
            TransformError::DataFrame { message } => PipelineError::DataFrame { message },
        }
    }
}

/// Result type for cleaning operations.
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_bounds_become_config_errors() {
        let err: PipelineError = TransformError::InvertedBounds {
            column: "bmi".to_string(),
            lower: 60.0,
            upper: 10.0,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invalid fields config: numeric_bounds.bmi: lower (60) is greater than upper (10)"
        );
    }

    #[test]
    fn non_numeric_keeps_column_name() {
        let err: PipelineError = TransformError::NonNumericColumn {
            column: "sex".to_string(),
            dtype: "str".to_string(),
        }
        .into();
        assert!(matches!(err, PipelineError::NonNumericColumn { column, .. } if column == "sex"));
    }
}
