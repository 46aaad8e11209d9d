//! Cohort construction: projection, missing-data policy and the sample-size gate.

use std::str::FromStr;

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};
use tracing::debug;

use epi_model::{ConfigError, PipelineError, Result};
use epi_transform::rows_with_missing;

/// Missing-data policy from `analysis.options.dropna_strategy`.
///
/// Both policies currently drop any row with a missing value in a model
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropnaStrategy {
    Modelwise,
    CompleteCase,
}

impl FromStr for DropnaStrategy {
    type Err = ConfigError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "modelwise" => Ok(Self::Modelwise),
            "complete_case" => Ok(Self::CompleteCase),
            _ => Err(ConfigError::UnsupportedStrategy {
                value: value.to_string(),
            }),
        }
    }
}

/// Union of the column groups without duplicates, in first-occurrence order.
pub fn model_columns(groups: &[&[String]]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for name in groups.iter().flat_map(|group| group.iter()) {
        if !columns.contains(name) {
            columns.push(name.clone());
        }
    }
    columns
}

/// Project `df` onto `columns`, failing on the first absent one.
pub fn select_columns(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    if let Some(missing) = columns.iter().find(|name| df.column(name).is_err()) {
        return Err(PipelineError::ColumnNotFound {
            column: missing.clone(),
        });
    }
    Ok(df.select(columns.iter().map(String::as_str))?)
}

/// Drop rows with a null (or NaN) in any of `columns`.
pub fn drop_incomplete_rows(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let keep: Vec<bool> = rows_with_missing(df, columns)?
        .into_iter()
        .map(|missing| !missing)
        .collect();
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(df.filter(&mask)?)
}

/// Build the model dataset.
///
/// Projects onto outcome, exposure and covariate columns (deduplicated, first
/// occurrence order) and applies `dropna_strategy`.
pub fn build_model_dataset(
    df: &DataFrame,
    outcome_cols: &[String],
    exposure_cols: &[String],
    covariate_cols: &[String],
    dropna_strategy: &str,
) -> Result<DataFrame> {
    let strategy: DropnaStrategy = dropna_strategy.parse()?;
    let columns = model_columns(&[outcome_cols, exposure_cols, covariate_cols]);
    let projected = select_columns(df, &columns)?;
    let cohort = match strategy {
        DropnaStrategy::Modelwise | DropnaStrategy::CompleteCase => {
            drop_incomplete_rows(&projected, &columns)?
        }
    };
    debug!(
        strategy = ?strategy,
        columns = columns.len(),
        input_rows = df.height(),
        cohort_rows = cohort.height(),
        "model dataset built"
    );
    Ok(cohort)
}

/// Fail when the cohort is smaller than `min_rows`.
pub fn ensure_min_rows(df: &DataFrame, min_rows: usize) -> Result<()> {
    if df.height() < min_rows {
        return Err(PipelineError::InsufficientData {
            observed: df.height(),
            required: min_rows,
        });
    }
    Ok(())
}
