//! Configuration validation and dataset ingestion.
//!
//! # Features
//!
//! - **Config loading**: read the project and fields YAML documents
//! - **Validation**: required sections, outcome family, survival columns
//! - **Placeholder scan**: every unfilled template value, reported together
//! - **Dataset loading**: CSV, TSV and Parquet into Polars DataFrames
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use epi_ingest::{LoadedConfig, read_dataset};
//!
//! let config = LoadedConfig::load(Path::new("project.yaml"), Path::new("fields.yaml"))?;
//! let df = read_dataset(&config.project.data.input_path, &config.project.data.format)?;
//! ```

mod config;
mod dataset;

pub use config::{
    LoadedConfig, REQUIRED_SECTIONS, find_placeholders, load_yaml, validate_field_config,
    validate_project_config,
};
pub use dataset::{DataFormat, NULL_TOKENS, read_dataset};
