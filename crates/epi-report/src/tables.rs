//! Tabular views of pipeline results.

use polars::prelude::{Column, DataFrame};

use epi_model::{CohortFlow, ColumnProfile, ModelResult, Result};

/// Column order of `model_summary.csv`.
pub const MODEL_SUMMARY_COLUMNS: [&str; 8] = [
    "model_type",
    "exposure",
    "term",
    "coef",
    "lower_ci",
    "upper_ci",
    "p_value",
    "effect",
];

/// Column order of `data_profile.csv`.
pub const PROFILE_COLUMNS: [&str; 5] = ["column", "dtype", "n_missing", "missing_rate", "n_unique"];

/// One row per model result, in result order.
///
/// An empty slice yields a zero-row frame with the same eight typed columns.
pub fn model_summary_frame(results: &[ModelResult]) -> Result<DataFrame> {
    let model_type: Vec<&str> = results.iter().map(|r| r.model_type.as_str()).collect();
    let exposure: Vec<&str> = results.iter().map(|r| r.exposure.as_str()).collect();
    let term: Vec<&str> = results.iter().map(|r| r.term.as_str()).collect();

    let df = DataFrame::new(vec![
        Column::new(MODEL_SUMMARY_COLUMNS[0].into(), model_type),
        Column::new(MODEL_SUMMARY_COLUMNS[1].into(), exposure),
        Column::new(MODEL_SUMMARY_COLUMNS[2].into(), term),
        Column::new(MODEL_SUMMARY_COLUMNS[3].into(), floats(results, |r| r.coef)),
        Column::new(MODEL_SUMMARY_COLUMNS[4].into(), floats(results, |r| r.lower_ci)),
        Column::new(MODEL_SUMMARY_COLUMNS[5].into(), floats(results, |r| r.upper_ci)),
        Column::new(MODEL_SUMMARY_COLUMNS[6].into(), floats(results, |r| r.p_value)),
        Column::new(MODEL_SUMMARY_COLUMNS[7].into(), floats(results, |r| r.effect)),
    ])?;
    Ok(df)
}

fn floats(results: &[ModelResult], field: impl Fn(&ModelResult) -> f64) -> Vec<f64> {
    results.iter().map(field).collect()
}

/// Long-form cohort flow: `step,n`.
pub fn cohort_flow_frame(flow: &CohortFlow) -> Result<DataFrame> {
    let steps = flow.steps();
    let df = DataFrame::new(vec![
        Column::new(
            "step".into(),
            steps.iter().map(|(step, _)| *step).collect::<Vec<&str>>(),
        ),
        Column::new(
            "n".into(),
            steps.iter().map(|(_, n)| *n as u64).collect::<Vec<u64>>(),
        ),
    ])?;
    Ok(df)
}

/// One row per profiled column.
pub fn profile_frame(profiles: &[ColumnProfile]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new(
            PROFILE_COLUMNS[0].into(),
            profiles.iter().map(|p| p.column.as_str()).collect::<Vec<&str>>(),
        ),
        Column::new(
            PROFILE_COLUMNS[1].into(),
            profiles.iter().map(|p| p.dtype.as_str()).collect::<Vec<&str>>(),
        ),
        Column::new(
            PROFILE_COLUMNS[2].into(),
            profiles.iter().map(|p| p.n_missing as u64).collect::<Vec<u64>>(),
        ),
        Column::new(
            PROFILE_COLUMNS[3].into(),
            profiles.iter().map(|p| p.missing_rate).collect::<Vec<f64>>(),
        ),
        Column::new(
            PROFILE_COLUMNS[4].into(),
            profiles.iter().map(|p| p.n_unique as u64).collect::<Vec<u64>>(),
        ),
    ])?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use epi_model::ModelType;
    use polars::prelude::DataType;

    #[test]
    fn empty_results_keep_schema() {
        let df = model_summary_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, MODEL_SUMMARY_COLUMNS);
        assert_eq!(df.column("model_type").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("effect").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn rows_follow_result_order() {
        let results = vec![
            ModelResult::new(ModelType::Linear, "x", "x", 0.5, (0.1, 0.9), 0.01),
            ModelResult::new(ModelType::Linear, "x", "age", -0.1, (-0.2, 0.0), 0.05),
        ];
        let df = model_summary_frame(&results).unwrap();
        let terms: Vec<Option<&str>> = df.column("term").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(terms, vec![Some("x"), Some("age")]);
    }

    #[test]
    fn cohort_flow_is_long_form() {
        let df = cohort_flow_frame(&CohortFlow::new(10, 7)).unwrap();
        let n: Vec<Option<u64>> = df.column("n").unwrap().u64().unwrap().into_iter().collect();
        assert_eq!(n, vec![Some(10), Some(7), Some(3)]);
    }
}
