//! Column cleaning for the cohort regression pipeline.
//!
//! Cleaning is a fixed sequence of pure steps over a Polars DataFrame:
//! rename, missing-code substitution, category remapping, numeric clipping
//! and optional standardization. Each step is available as a free function
//! and as a [`CleaningStep`] in the [`CleaningPipeline`].

pub mod error;
pub mod pipeline;
pub mod steps;
pub mod values;

pub use error::{Result, TransformError};
pub use pipeline::{
    CategoryMapStep, CleaningPipeline, CleaningStep, MissingCodesStep, NumericBoundsStep,
    RenameStep, StandardizeStep, build_cleaning_pipeline,
};
pub use steps::{
    apply_category_maps, clip_numeric_bounds, rename_columns, replace_missing_codes,
    standardize_numeric_columns,
};
pub use values::{cell_scalars, is_numeric_dtype, missing_mask, rows_with_missing};
