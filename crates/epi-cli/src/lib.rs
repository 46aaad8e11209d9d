//! CLI library components for the cohort regression pipeline.

pub mod logging;
