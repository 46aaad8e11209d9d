//! Column cleaning operations.
//!
//! Each function takes the table by reference and returns a new table; the
//! caller's frame is never modified.

use std::collections::BTreeMap;

use polars::prelude::{ChunkAgg, ChunkVar, Column, DataFrame, DataType, Float64Chunked};
use tracing::debug;

use epi_model::{Bounds, CategoryMap, Scalar};

use crate::error::{Result, TransformError};
use crate::values::{cell_scalars, is_numeric_dtype, scalars_inferred, scalars_with_dtype};

/// Relabel columns with `rename_map` (old name to new name).
///
/// Unmapped columns keep their name. When two columns end up with the same
/// name, the later one replaces the earlier one at the earlier position.
pub fn rename_columns(df: &DataFrame, rename_map: &BTreeMap<String, String>) -> Result<DataFrame> {
    if rename_map.is_empty() {
        return Ok(df.clone());
    }
    let mut columns: Vec<Column> = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let name = column.name().as_str();
        let target = rename_map.get(name).map_or(name, String::as_str);
        let renamed = column.clone().with_name(target.into());
        match columns.iter().position(|c| c.name().as_str() == target) {
            Some(index) => columns[index] = renamed,
            None => columns.push(renamed),
        }
    }
    Ok(DataFrame::new(columns)?)
}

/// Null every cell equal to one of `codes`, in every column.
///
/// Numeric codes match numeric cells by value; text codes match text cells
/// exactly. Column dtypes are preserved.
pub fn replace_missing_codes(df: &DataFrame, codes: &[Scalar]) -> Result<DataFrame> {
    let mut out = df.clone();
    if codes.is_empty() {
        return Ok(out);
    }
    for column in df.get_columns() {
        let mut cells = cell_scalars(column)?;
        let mut replaced = 0usize;
        for cell in &mut cells {
            if cell
                .as_ref()
                .is_some_and(|value| codes.iter().any(|code| code.loosely_eq(value)))
            {
                *cell = None;
                replaced += 1;
            }
        }
        if replaced == 0 {
            continue;
        }
        debug!(column = %column.name(), replaced, "missing codes nulled");
        out.with_column(scalars_with_dtype(column.name().as_str(), &cells, column.dtype())?)?;
    }
    Ok(out)
}

/// Remap values per column; unmapped values pass through unchanged.
///
/// Columns absent from the table are skipped.
pub fn apply_category_maps(
    df: &DataFrame,
    category_maps: &BTreeMap<String, CategoryMap>,
) -> Result<DataFrame> {
    let mut out = df.clone();
    for (name, map) in category_maps {
        let Ok(column) = df.column(name) else {
            debug!(column = %name, "category map target absent, skipped");
            continue;
        };
        let cells = cell_scalars(column)?;
        if cells.iter().all(Option::is_none) {
            continue;
        }
        let mapped: Vec<Option<Scalar>> = cells
            .into_iter()
            .map(|cell| cell.map(|value| map.lookup(&value).cloned().unwrap_or(value)))
            .collect();
        out.with_column(scalars_inferred(name, &mapped, column.dtype()))?;
    }
    Ok(out)
}

/// Clamp numeric columns to their configured bounds; result columns are Float64.
///
/// Columns absent from the table are skipped. Missing cells stay missing.
pub fn clip_numeric_bounds(
    df: &DataFrame,
    numeric_bounds: &BTreeMap<String, Bounds>,
) -> Result<DataFrame> {
    let mut out = df.clone();
    for (name, bounds) in numeric_bounds {
        let lower = bounds.lower_or_unbounded();
        let upper = bounds.upper_or_unbounded();
        if lower > upper {
            return Err(TransformError::InvertedBounds {
                column: name.clone(),
                lower,
                upper,
            });
        }
        let Ok(column) = df.column(name) else {
            debug!(column = %name, "clip target absent, skipped");
            continue;
        };
        let values = numeric_values(name, column)?;
        let clipped: Vec<Option<f64>> = values
            .into_iter()
            .map(|value| value.map(|v| clamp(v, lower, upper)))
            .collect();
        out.with_column(Column::new(name.as_str().into(), clipped))?;
    }
    Ok(out)
}

/// Z-score the listed numeric columns with the sample standard deviation.
///
/// Absent and non-numeric columns are skipped. A column whose standard
/// deviation is zero or undefined is left as it is.
pub fn standardize_numeric_columns(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let mut out = df.clone();
    for name in columns {
        let Ok(column) = df.column(name) else {
            continue;
        };
        if !is_numeric_dtype(column.dtype()) {
            debug!(column = %name, dtype = %column.dtype(), "non-numeric column not standardized");
            continue;
        }
        let values = numeric_values(name, column)?;
        let observed: Vec<f64> = values
            .iter()
            .flatten()
            .copied()
            .filter(|value| !value.is_nan())
            .collect();
        let constant = observed.windows(2).all(|pair| pair[0] == pair[1]);
        let observed = Float64Chunked::from_vec(name.as_str().into(), observed);
        let (Some(mean), Some(sd)) = (observed.mean(), observed.std(1)) else {
            continue;
        };
        // Summation leaves a residual sd of a few ulps on constant input.
        if constant || !sd.is_finite() || sd <= f64::EPSILON * mean.abs().max(1.0) {
            debug!(column = %name, "zero variance, left unstandardized");
            continue;
        }
        let scaled: Vec<Option<f64>> = values
            .into_iter()
            .map(|value| value.map(|v| (v - mean) / sd))
            .collect();
        out.with_column(Column::new(name.as_str().into(), scaled))?;
    }
    Ok(out)
}

fn numeric_values(name: &str, column: &Column) -> Result<Vec<Option<f64>>> {
    if !is_numeric_dtype(column.dtype()) {
        return Err(TransformError::NonNumericColumn {
            column: name.to_string(),
            dtype: column.dtype().to_string(),
        });
    }
    let values = column.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

fn clamp(value: f64, lower: f64, upper: f64) -> f64 {
    if value.is_nan() {
        value
    } else {
        value.max(lower).min(upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: Vec<Column>) -> DataFrame {
        DataFrame::new(columns).unwrap()
    }

    fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name).unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn rename_passes_unmapped_columns_through() {
        let df = frame(vec![
            Column::new("raw_x".into(), vec![1.0, 2.0]),
            Column::new("age".into(), vec![50.0, 60.0]),
        ]);
        let map = BTreeMap::from([("raw_x".to_string(), "x".to_string())]);
        let out = rename_columns(&df, &map).unwrap();
        let names: Vec<&str> = out.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["x", "age"]);
    }

    #[test]
    fn rename_collision_keeps_later_column() {
        let df = frame(vec![
            Column::new("x".into(), vec![1i64, 2]),
            Column::new("raw_x".into(), vec![10i64, 20]),
        ]);
        let map = BTreeMap::from([("raw_x".to_string(), "x".to_string())]);
        let out = rename_columns(&df, &map).unwrap();
        assert_eq!(out.width(), 1);
        let values: Vec<Option<i64>> = out.column("x").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(10), Some(20)]);
    }

    #[test]
    fn rename_collision_follows_column_order_not_key_order() {
        let df = frame(vec![
            Column::new("id".into(), vec![1i64, 2]),
            Column::new("z_old".into(), vec![10i64, 20]),
            Column::new("a_old".into(), vec![30i64, 40]),
        ]);
        let map = BTreeMap::from([
            ("a_old".to_string(), "x".to_string()),
            ("z_old".to_string(), "x".to_string()),
        ]);
        let out = rename_columns(&df, &map).unwrap();
        let names: Vec<&str> = out.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["id", "x"]);
        let values: Vec<Option<i64>> = out.column("x").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(30), Some(40)]);
    }

    #[test]
    fn missing_codes_preserve_dtype() {
        let df = frame(vec![
            Column::new("age".into(), vec![Some(-1i32), Some(55), None]),
            Column::new("smoker".into(), vec!["unknown", "yes", "no"]),
        ]);
        let codes = vec![Scalar::Int(-1), Scalar::Text("unknown".to_string())];
        let out = replace_missing_codes(&df, &codes).unwrap();
        assert_eq!(out.column("age").unwrap().dtype(), &DataType::Int32);
        assert_eq!(out.column("age").unwrap().null_count(), 2);
        assert_eq!(out.column("smoker").unwrap().null_count(), 1);
    }

    #[test]
    fn numeric_code_does_not_match_text() {
        let df = frame(vec![Column::new("code".into(), vec!["-1", "2"])]);
        let out = replace_missing_codes(&df, &[Scalar::Int(-1)]).unwrap();
        assert_eq!(out.column("code").unwrap().null_count(), 0);
    }

    #[test]
    fn category_map_identity_fallback() {
        let df = frame(vec![Column::new("sex".into(), vec![Some(0i64), Some(1), Some(9), None])]);
        let map = CategoryMap::from_entries(vec![
            (Scalar::Int(0), Scalar::Text("female".to_string())),
            (Scalar::Int(1), Scalar::Text("male".to_string())),
        ]);
        let maps = BTreeMap::from([("sex".to_string(), map)]);
        let out = apply_category_maps(&df, &maps).unwrap();
        let values: Vec<Option<&str>> = out.column("sex").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("female"), Some("male"), Some("9"), None]);
    }

    #[test]
    fn category_map_to_numbers_stays_numeric() {
        let df = frame(vec![Column::new("sex".into(), vec!["F", "M"])]);
        let map = CategoryMap::from_entries(vec![
            (Scalar::Text("F".to_string()), Scalar::Int(0)),
            (Scalar::Text("M".to_string()), Scalar::Int(1)),
        ]);
        let maps = BTreeMap::from([("sex".to_string(), map)]);
        let out = apply_category_maps(&df, &maps).unwrap();
        assert_eq!(floats(&out, "sex"), vec![Some(0.0), Some(1.0)]);
    }

    #[test]
    fn clip_rejects_text_columns() {
        let df = frame(vec![Column::new("sex".into(), vec!["F", "M"])]);
        let bounds = BTreeMap::from([("sex".to_string(), Bounds::new(Some(0.0), None))]);
        let err = clip_numeric_bounds(&df, &bounds).unwrap_err();
        assert!(matches!(err, TransformError::NonNumericColumn { .. }));
    }

    #[test]
    fn clip_keeps_missing_cells() {
        let df = frame(vec![Column::new("bmi".into(), vec![Some(f64::NAN), None, Some(80.0)])]);
        let bounds = BTreeMap::from([("bmi".to_string(), Bounds::new(Some(10.0), Some(60.0)))]);
        let out = clip_numeric_bounds(&df, &bounds).unwrap();
        let values = floats(&out, "bmi");
        assert!(values[0].is_some_and(f64::is_nan));
        assert_eq!(values[1], None);
        assert_eq!(values[2], Some(60.0));
    }

    #[test]
    fn standardize_centers_and_scales() {
        let df = frame(vec![Column::new("x".into(), vec![1.0, 2.0, 3.0])]);
        let out = standardize_numeric_columns(&df, &["x".to_string()]).unwrap();
        assert_eq!(floats(&out, "x"), vec![Some(-1.0), Some(0.0), Some(1.0)]);
    }

    #[test]
    fn standardize_leaves_constant_columns_exact() {
        for value in [4.2, 0.1, -1234.5678, 1.0e9 + 0.3] {
            let df = frame(vec![Column::new("c".into(), vec![value; 7])]);
            let out = standardize_numeric_columns(&df, &["c".to_string()]).unwrap();
            assert_eq!(floats(&out, "c"), vec![Some(value); 7], "{value}");
        }
    }

    #[test]
    fn standardize_ignores_missing_cells_when_checking_variance() {
        let df = frame(vec![Column::new(
            "c".into(),
            vec![Some(4.2), None, Some(f64::NAN), Some(4.2)],
        )]);
        let out = standardize_numeric_columns(&df, &["c".to_string()]).unwrap();
        let values = floats(&out, "c");
        assert_eq!(values[0], Some(4.2));
        assert_eq!(values[1], None);
        assert_eq!(values[3], Some(4.2));
    }

    #[test]
    fn standardize_skips_text_and_absent_columns() {
        let df = frame(vec![Column::new("sex".into(), vec!["F", "M"])]);
        let out = standardize_numeric_columns(&df, &["sex".to_string(), "bmi".to_string()]).unwrap();
        assert!(out.equals(&df));
    }
}
