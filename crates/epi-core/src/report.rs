//! Cohort flow and column profiles.

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};

use epi_model::{CohortFlow, ColumnProfile, Result};
use epi_transform::missing_mask;

/// Row counts before and after cohort construction.
pub fn cohort_flow(before: &DataFrame, after: &DataFrame) -> CohortFlow {
    CohortFlow::new(before.height(), after.height())
}

/// Missingness and distinct non-missing values per column.
pub fn profile_columns(df: &DataFrame) -> Result<Vec<ColumnProfile>> {
    let rows = df.height();
    df.get_columns()
        .iter()
        .map(|column| -> Result<ColumnProfile> {
            let missing = missing_mask(column)?;
            let n_missing = missing.iter().filter(|m| **m).count();
            let present: Vec<bool> = missing.iter().map(|m| !m).collect();
            let present = BooleanChunked::from_slice("present".into(), &present);
            let n_unique = column.as_materialized_series().filter(&present)?.n_unique()?;
            Ok(ColumnProfile {
                column: column.name().to_string(),
                dtype: column.dtype().to_string(),
                n_missing,
                missing_rate: if rows == 0 {
                    0.0
                } else {
                    n_missing as f64 / rows as f64
                },
                n_unique,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    #[test]
    fn profile_counts_missing_and_distinct() {
        let df = DataFrame::new(vec![
            Column::new("x".into(), vec![Some(1.0), Some(1.0), Some(f64::NAN), None]),
            Column::new("sex".into(), vec![Some("F"), Some("M"), Some("F"), Some("M")]),
        ])
        .unwrap();

        let profiles = profile_columns(&df).unwrap();

        assert_eq!(profiles[0].column, "x");
        assert_eq!(profiles[0].dtype, "f64");
        assert_eq!(profiles[0].n_missing, 2);
        assert_eq!(profiles[0].missing_rate, 0.5);
        assert_eq!(profiles[0].n_unique, 1);
        assert_eq!(profiles[1].n_missing, 0);
        assert_eq!(profiles[1].n_unique, 2);
    }

    #[test]
    fn empty_table_has_zero_missing_rate() {
        let df = DataFrame::new(vec![Column::new("x".into(), Vec::<f64>::new())]).unwrap();
        let profiles = profile_columns(&df).unwrap();
        assert_eq!(profiles[0].missing_rate, 0.0);
        assert_eq!(profiles[0].n_unique, 0);
    }

    #[test]
    fn flow_excludes_difference() {
        let before = DataFrame::new(vec![Column::new("x".into(), vec![1, 2, 3])]).unwrap();
        let after = before.head(Some(1));
        assert_eq!(cohort_flow(&before, &after), CohortFlow::new(3, 1));
    }
}
