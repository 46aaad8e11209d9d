//! Error types for model fitting.

use thiserror::Error;

/// Reasons a model could not be fitted.
#[derive(Debug, Error)]
pub enum FitError {
    /// Design matrix has no columns.
    #[error("design matrix has no columns")]
    EmptyDesign,

    /// Response and design disagree on the number of rows.
    #[error("response has {response} rows but design has {design}")]
    DimensionMismatch { response: usize, design: usize },

    /// Not enough rows to estimate the parameters.
    #[error("{observations} observations are too few for {parameters} parameters")]
    TooFewObservations {
        observations: usize,
        parameters: usize,
    },

    /// Information matrix is not positive definite (collinear or constant columns).
    #[error("singular design: term '{term}' is collinear with earlier terms or constant")]
    Singular { term: String },

    /// Newton iterations did not settle.
    #[error("did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },

    /// Response values outside what the model family accepts.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Survival data without a single event.
    #[error("no events in survival data")]
    NoEvents,

    /// Inputs contain NaN or infinite values.
    #[error("non-finite value in {what}")]
    NonFinite { what: String },

    /// Reference distribution could not be constructed.
    #[error("invalid reference distribution: {0}")]
    Distribution(String),
}

/// Result type for fitting operations.
pub type Result<T> = std::result::Result<T, FitError>;
