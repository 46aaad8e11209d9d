//! Output for the cohort regression pipeline.
//!
//! - **tables**: model summary, cohort flow and column profile frames
//! - **writer**: CSV tables and the JSON run metadata

mod tables;
mod writer;

pub use tables::{
    MODEL_SUMMARY_COLUMNS, PROFILE_COLUMNS, cohort_flow_frame, model_summary_frame, profile_frame,
};
pub use writer::{write_run_metadata, write_table};
