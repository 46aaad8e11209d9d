//! Ordered cleaning pipeline.
//!
//! # Standard Pipeline Order
//!
//! 1. **RenameStep** - relabel columns
//! 2. **MissingCodesStep** - null sentinel values dataset-wide
//! 3. **CategoryMapStep** - remap values per column
//! 4. **NumericBoundsStep** - clip numeric columns
//! 5. **StandardizeStep** - z-score exposure and covariate columns
//!
//! Later steps address columns by their post-rename names and expect
//! sentinels to be nulled already, so the order is fixed.
//!
//! # Example
//!
//! ```ignore
//! use epi_transform::build_cleaning_pipeline;
//!
//! let pipeline = build_cleaning_pipeline(&fields, &standardize_columns);
//! let cleaned = pipeline.execute(&raw)?;
//! ```

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use tracing::debug;

use epi_model::{Bounds, CategoryMap, FieldConfig, Scalar};

use crate::error::Result;
use crate::steps;

/// A single cleaning step.
pub trait CleaningStep: Send + Sync {
    /// Produce the cleaned table; the input is left untouched.
    fn apply(&self, df: &DataFrame) -> Result<DataFrame>;

    /// Name used in logs.
    fn step_name(&self) -> &str;

    /// Whether the step has nothing to do.
    fn should_skip(&self) -> bool {
        false
    }
}

/// Steps run in insertion order.
pub struct CleaningPipeline {
    steps: Vec<Box<dyn CleaningStep>>,
}

impl Default for CleaningPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl CleaningPipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step(mut self, step: Box<dyn CleaningStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn insert_step(mut self, index: usize, step: Box<dyn CleaningStep>) -> Self {
        self.steps.insert(index, step);
        self
    }

    pub fn remove_step(mut self, step_name: &str) -> Self {
        self.steps.retain(|s| s.step_name() != step_name);
        self
    }

    /// Run every step that is not skipped, in order.
    pub fn execute(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut current = df.clone();
        for step in &self.steps {
            if step.should_skip() {
                debug!(step = step.step_name(), "cleaning step skipped");
                continue;
            }
            current = step.apply(&current)?;
            debug!(
                step = step.step_name(),
                rows = current.height(),
                columns = current.width(),
                "cleaning step applied"
            );
        }
        Ok(current)
    }

    /// List step names in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.step_name()).collect()
    }
}

pub struct RenameStep {
    pub rename_map: BTreeMap<String, String>,
}

impl CleaningStep for RenameStep {
    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        steps::rename_columns(df, &self.rename_map)
    }

    fn step_name(&self) -> &str {
        "rename"
    }

    fn should_skip(&self) -> bool {
        self.rename_map.is_empty()
    }
}

pub struct MissingCodesStep {
    pub codes: Vec<Scalar>,
}

impl CleaningStep for MissingCodesStep {
    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        steps::replace_missing_codes(df, &self.codes)
    }

    fn step_name(&self) -> &str {
        "missing_codes"
    }

    fn should_skip(&self) -> bool {
        self.codes.is_empty()
    }
}

pub struct CategoryMapStep {
    pub category_maps: BTreeMap<String, CategoryMap>,
}

impl CleaningStep for CategoryMapStep {
    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        steps::apply_category_maps(df, &self.category_maps)
    }

    fn step_name(&self) -> &str {
        "category_maps"
    }

    fn should_skip(&self) -> bool {
        self.category_maps.is_empty()
    }
}

pub struct NumericBoundsStep {
    pub numeric_bounds: BTreeMap<String, Bounds>,
}

impl CleaningStep for NumericBoundsStep {
    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        steps::clip_numeric_bounds(df, &self.numeric_bounds)
    }

    fn step_name(&self) -> &str {
        "numeric_bounds"
    }

    fn should_skip(&self) -> bool {
        self.numeric_bounds.is_empty()
    }
}

/// Runs only when given columns; an empty list means standardization is off.
pub struct StandardizeStep {
    pub columns: Vec<String>,
}

impl CleaningStep for StandardizeStep {
    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        steps::standardize_numeric_columns(df, &self.columns)
    }

    fn step_name(&self) -> &str {
        "standardize"
    }

    fn should_skip(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Build the cleaning pipeline for a fields configuration.
///
/// `standardize_columns` is empty unless `analysis.options.standardize_numeric`
/// is set; callers pass exposure and covariate columns without outcomes.
pub fn build_cleaning_pipeline(
    fields: &FieldConfig,
    standardize_columns: &[String],
) -> CleaningPipeline {
    CleaningPipeline::new()
        .add_step(Box::new(RenameStep {
            rename_map: fields.rename_map.clone(),
        }))
        .add_step(Box::new(MissingCodesStep {
            codes: fields.missing_codes.clone(),
        }))
        .add_step(Box::new(CategoryMapStep {
            category_maps: fields.category_maps.clone(),
        }))
        .add_step(Box::new(NumericBoundsStep {
            numeric_bounds: fields.numeric_bounds.clone(),
        }))
        .add_step(Box::new(StandardizeStep {
            columns: standardize_columns.to_vec(),
        }))
}
