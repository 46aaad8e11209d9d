//! Model dispatch.
//!
//! One exhaustive match over the outcome family picks the fitting procedure
//! per exposure. Each family's native output is normalized into
//! [`ModelResult`] rows right where it is produced.

use polars::prelude::{DataFrame, DataType};
use tracing::{info, warn};

use epi_model::{ModelResult, ModelType, OutcomeSpec, PipelineError, Result};
use epi_stats::{
    CoxConfig, CoxFit, Design, FitError, INTERCEPT, LogitConfig, LogitFit, OlsFit, fit_cox,
    fit_logit, fit_ols,
};
use epi_transform::is_numeric_dtype;

use crate::cohort::{drop_incomplete_rows, model_columns, select_columns};

/// Fit one model per exposure and collect the normalized results in exposure order.
pub fn fit_exposures(
    df: &DataFrame,
    outcome: &OutcomeSpec,
    exposures: &[String],
    covariates: &[String],
) -> Result<Vec<ModelResult>> {
    let mut results = Vec::new();
    for exposure in exposures {
        let fitted = match outcome {
            OutcomeSpec::Continuous { column } => fit_linear(df, column, exposure, covariates)?,
            OutcomeSpec::Binary { column } => fit_logistic(df, column, exposure, covariates)?,
            OutcomeSpec::Survival {
                time_column,
                event_column,
            } => vec![fit_survival(
                df,
                time_column,
                event_column,
                exposure,
                covariates,
            )?],
        };
        info!(
            model_type = %outcome.model_type(),
            exposure = %exposure,
            terms = fitted.len(),
            "exposure fitted"
        );
        results.extend(fitted);
    }
    Ok(results)
}

/// OLS of `outcome` on the exposure and covariates, with intercept.
pub fn fit_linear(
    df: &DataFrame,
    outcome: &str,
    exposure: &str,
    covariates: &[String],
) -> Result<Vec<ModelResult>> {
    let predictors = predictors(exposure, covariates);
    let data = model_frame(df, &[outcome.to_string()], &predictors)?;
    let response = numeric_column(&data, outcome)?;
    let design = design(&data, &predictors, ModelType::Linear, exposure)?.with_intercept();
    let fit = fit_ols(&design, &response).map_err(fit_error(ModelType::Linear, exposure))?;
    Ok(normalize_ols(&fit, exposure))
}

/// Logistic regression of a 0/1 `outcome` on the exposure and covariates, with intercept.
pub fn fit_logistic(
    df: &DataFrame,
    outcome: &str,
    exposure: &str,
    covariates: &[String],
) -> Result<Vec<ModelResult>> {
    let predictors = predictors(exposure, covariates);
    let data = model_frame(df, &[outcome.to_string()], &predictors)?;
    let response = numeric_column(&data, outcome)?;
    if let Some(value) = response.iter().find(|v| **v != 0.0 && **v != 1.0) {
        return Err(PipelineError::InvalidOutcome {
            column: outcome.to_string(),
            reason: format!("binary outcome must be 0/1, found {value}"),
        });
    }
    let design = design(&data, &predictors, ModelType::Logistic, exposure)?.with_intercept();
    let fit = fit_logit(&design, &response, LogitConfig::default())
        .map_err(fit_error(ModelType::Logistic, exposure))?;
    Ok(normalize_logit(&fit, exposure))
}

/// Cox model on time, event, exposure and covariates; returns the exposure row only.
///
/// Predictors without variance in the model data are dropped first.
pub fn fit_survival(
    df: &DataFrame,
    time_column: &str,
    event_column: &str,
    exposure: &str,
    covariates: &[String],
) -> Result<ModelResult> {
    let predictors = predictors(exposure, covariates);
    let outcome_columns = [time_column.to_string(), event_column.to_string()];
    let data = model_frame(df, &outcome_columns, &predictors)?;
    let time = numeric_column(&data, time_column)?;
    let event: Vec<bool> = numeric_column(&data, event_column)?
        .into_iter()
        .map(|value| value != 0.0)
        .collect();

    let mut columns = Vec::with_capacity(predictors.len());
    for name in &predictors {
        let values = numeric_column(&data, name)?;
        if has_variance(&values) {
            columns.push((name.clone(), values));
        } else {
            warn!(column = %name, exposure = %exposure, "zero-variance predictor dropped from cox model");
        }
    }
    if !columns.iter().any(|(name, _)| name == exposure) {
        return Err(term_not_found(ModelType::Cox, exposure));
    }
    let design = Design::from_columns(&columns).map_err(fit_error(ModelType::Cox, exposure))?;
    let fit = fit_cox(&design, &time, &event, CoxConfig::default())
        .map_err(fit_error(ModelType::Cox, exposure))?;
    normalize_cox(&fit, exposure)
}

/// Every non-intercept OLS coefficient as a `linear` result.
pub fn normalize_ols(fit: &OlsFit, exposure: &str) -> Vec<ModelResult> {
    fit.coefficients
        .iter()
        .filter(|row| row.term != INTERCEPT)
        .map(|row| {
            ModelResult::new(
                ModelType::Linear,
                exposure,
                row.term.as_str(),
                row.coef,
                (row.lower_ci, row.upper_ci),
                row.p_value,
            )
        })
        .collect()
}

/// Every non-intercept logistic coefficient as a `logistic` result.
pub fn normalize_logit(fit: &LogitFit, exposure: &str) -> Vec<ModelResult> {
    fit.coefficients
        .iter()
        .filter(|row| row.term != INTERCEPT)
        .map(|row| {
            ModelResult::new(
                ModelType::Logistic,
                exposure,
                row.term.as_str(),
                row.coef,
                (row.lower_ci, row.upper_ci),
                row.p_value,
            )
        })
        .collect()
}

/// The exposure row of a Cox summary as a `cox` result.
pub fn normalize_cox(fit: &CoxFit, exposure: &str) -> Result<ModelResult> {
    let row = fit
        .term(exposure)
        .ok_or_else(|| term_not_found(ModelType::Cox, exposure))?;
    Ok(ModelResult::new(
        ModelType::Cox,
        exposure,
        exposure,
        row.coef,
        (row.coef_lower_95, row.coef_upper_95),
        row.p,
    ))
}

/// Exposure followed by covariates, without repeats.
fn predictors(exposure: &str, covariates: &[String]) -> Vec<String> {
    model_columns(&[&[exposure.to_string()], covariates])
}

/// Per-model projection and row filter.
fn model_frame(df: &DataFrame, outcome: &[String], predictors: &[String]) -> Result<DataFrame> {
    let columns = model_columns(&[outcome, predictors]);
    let projected = select_columns(df, &columns)?;
    drop_incomplete_rows(&projected, &columns)
}

/// Column values as `f64`; booleans become 0/1.
fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df.column(name)?;
    let dtype = column.dtype();
    if !is_numeric_dtype(dtype) && !matches!(dtype, DataType::Boolean) {
        return Err(PipelineError::NonNumericColumn {
            column: name.to_string(),
            dtype: dtype.to_string(),
        });
    }
    let values = column.cast(&DataType::Float64)?;
    Ok(values
        .f64()?
        .into_iter()
        .map(|value| value.unwrap_or(f64::NAN))
        .collect())
}

fn design(
    data: &DataFrame,
    predictors: &[String],
    model_type: ModelType,
    exposure: &str,
) -> Result<Design> {
    let columns = predictors
        .iter()
        .map(|name| Ok((name.clone(), numeric_column(data, name)?)))
        .collect::<Result<Vec<_>>>()?;
    Design::from_columns(&columns).map_err(fit_error(model_type, exposure))
}

fn has_variance(values: &[f64]) -> bool {
    values.first().is_some_and(|first| values.iter().any(|v| v != first))
}

fn fit_error(model_type: ModelType, exposure: &str) -> impl FnOnce(FitError) -> PipelineError {
    let exposure = exposure.to_string();
    move |source| PipelineError::Fit {
        model_type,
        exposure,
        source: Box::new(source),
    }
}

fn term_not_found(model_type: ModelType, exposure: &str) -> PipelineError {
    PipelineError::TermNotFound {
        model_type,
        term: exposure.to_string(),
    }
}
