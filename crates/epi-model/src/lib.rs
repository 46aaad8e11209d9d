//! Data model for the cohort regression pipeline.
//!
//! This crate holds the types shared by every pipeline stage:
//!
//! - **config**: typed project and field configuration documents
//! - **outcome**: the outcome family union (continuous, binary, survival)
//! - **scalar**: configuration cell values used by missing codes and category maps
//! - **results**: model results, cohort flow counts, column profiles, run metadata
//! - **error**: configuration and pipeline error types

pub mod config;
pub mod error;
pub mod outcome;
pub mod results;
pub mod scalar;

pub use config::{
    AnalysisOptions, AnalysisSection, Bounds, CategoryMap, ColumnList, DataSection,
    FieldConfig, FieldsDocument, OutputSection, PLACEHOLDER_MARKER, ProjectConfig,
    ProjectSection,
};
pub use error::{ConfigError, PipelineError, Result};
pub use outcome::{OutcomeKind, OutcomeSpec};
pub use results::{CohortFlow, ColumnProfile, ModelResult, ModelType, RunMetadata};
pub use scalar::Scalar;
