//! Cohort construction, model dispatch and pipeline orchestration.
//!
//! # Stages
//!
//! 1. Load and validate the project and fields documents (`epi-ingest`)
//! 2. Read the dataset and run the cleaning pipeline (`epi-transform`)
//! 3. Build the model cohort and enforce `min_rows` ([`cohort`])
//! 4. Fit one model per exposure ([`dispatch`])
//! 5. Write the summary, cohort flow, profile and metadata (`epi-report`)
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use epi_core::{RunContext, run_pipeline};
//!
//! let summary = run_pipeline(
//!     Path::new("config/project.yaml"),
//!     Path::new("config/fields.yaml"),
//!     &RunContext::new().with_seed(42),
//! )?;
//! println!("{} results", summary.results.len());
//! ```

pub mod cohort;
pub mod context;
pub mod dispatch;
pub mod pipeline;
pub mod report;

pub use cohort::{
    DropnaStrategy, build_model_dataset, drop_incomplete_rows, ensure_min_rows, model_columns,
    select_columns,
};
pub use context::RunContext;
pub use dispatch::{
    fit_exposures, fit_linear, fit_logistic, fit_survival, normalize_cox, normalize_logit,
    normalize_ols,
};
pub use pipeline::{
    ArtifactPaths, COHORT_FLOW_FILE, DATA_PROFILE_FILE, MODEL_SUMMARY_FILE, PreparedRun,
    RUN_METADATA_FILE, RunSummary, run_pipeline,
};
pub use report::{cohort_flow, profile_columns};
