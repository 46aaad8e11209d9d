//! Cell access shared by the cleaning steps, cohort construction and profiling.
//!
//! Configuration values are [`Scalar`]s, so steps that compare cells against
//! configuration read each column as a sequence of optional scalars and
//! rebuild a typed column afterwards.

use polars::prelude::{Column, DataFrame, DataType};

use epi_model::Scalar;

use crate::error::Result;

pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Integer or floating-point; booleans are not numeric here.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || is_float_dtype(dtype)
}

/// Per-row missingness of one column: null, or NaN in a floating-point column.
pub fn missing_mask(column: &Column) -> Result<Vec<bool>> {
    if is_float_dtype(column.dtype()) {
        let values = column.cast(&DataType::Float64)?;
        let mask = values
            .f64()?
            .into_iter()
            .map(|value| value.is_none_or(f64::is_nan))
            .collect();
        return Ok(mask);
    }
    Ok(column
        .is_null()
        .into_iter()
        .map(|flag| flag.unwrap_or(true))
        .collect())
}

/// Rows with a missing value in any of `columns`.
pub fn rows_with_missing(df: &DataFrame, columns: &[String]) -> Result<Vec<bool>> {
    let mut any_missing = vec![false; df.height()];
    for name in columns {
        let mask = missing_mask(df.column(name)?)?;
        for (row, missing) in any_missing.iter_mut().zip(mask) {
            *row |= missing;
        }
    }
    Ok(any_missing)
}

/// Read a column as optional scalars; nulls become `None`.
///
/// Integers, floats and booleans keep their kind; any other dtype is read
/// through its string representation.
pub fn cell_scalars(column: &Column) -> Result<Vec<Option<Scalar>>> {
    let dtype = column.dtype();
    let cells = if matches!(dtype, DataType::Boolean) {
        column
            .bool()?
            .into_iter()
            .map(|value| value.map(Scalar::Bool))
            .collect()
    } else if is_integer_dtype(dtype) {
        let values = column.cast(&DataType::Int64)?;
        values
            .i64()?
            .into_iter()
            .map(|value| value.map(Scalar::Int))
            .collect()
    } else if is_float_dtype(dtype) {
        let values = column.cast(&DataType::Float64)?;
        values
            .f64()?
            .into_iter()
            .map(|value| value.map(Scalar::Float))
            .collect()
    } else {
        let values = column.cast(&DataType::String)?;
        values
            .str()?
            .into_iter()
            .map(|value| value.map(|text| Scalar::Text(text.to_string())))
            .collect()
    };
    Ok(cells)
}

/// Rebuild a column with the same dtype it was read from.
pub fn scalars_with_dtype(name: &str, cells: &[Option<Scalar>], dtype: &DataType) -> Result<Column> {
    let column = if matches!(dtype, DataType::Boolean) {
        bool_column(name, cells)
    } else if is_integer_dtype(dtype) {
        int_column(name, cells).cast(dtype)?
    } else if is_float_dtype(dtype) {
        float_column(name, cells).cast(dtype)?
    } else {
        text_column(name, cells).cast(dtype)?
    };
    Ok(column)
}

/// Build a column whose dtype follows the values it holds.
///
/// Integer when every value is integral and the source was integer, float
/// when every value is numeric, boolean when every value is boolean, text
/// otherwise.
pub fn scalars_inferred(name: &str, cells: &[Option<Scalar>], source: &DataType) -> Column {
    let present = || cells.iter().flatten();
    if present().all(Scalar::is_numeric) {
        if is_integer_dtype(source) && present().all(Scalar::is_integral) {
            int_column(name, cells)
        } else {
            float_column(name, cells)
        }
    } else if present().all(|value| matches!(value, Scalar::Bool(_))) {
        bool_column(name, cells)
    } else {
        text_column(name, cells)
    }
}

fn int_column(name: &str, cells: &[Option<Scalar>]) -> Column {
    let values: Vec<Option<i64>> = cells
        .iter()
        .map(|cell| cell.as_ref().and_then(Scalar::as_f64).map(|value| value as i64))
        .collect();
    Column::new(name.into(), values)
}

fn float_column(name: &str, cells: &[Option<Scalar>]) -> Column {
    let values: Vec<Option<f64>> = cells
        .iter()
        .map(|cell| cell.as_ref().and_then(Scalar::as_f64))
        .collect();
    Column::new(name.into(), values)
}

fn bool_column(name: &str, cells: &[Option<Scalar>]) -> Column {
    let values: Vec<Option<bool>> = cells
        .iter()
        .map(|cell| match cell {
            Some(Scalar::Bool(flag)) => Some(*flag),
            _ => None,
        })
        .collect();
    Column::new(name.into(), values)
}

fn text_column(name: &str, cells: &[Option<Scalar>]) -> Column {
    let values: Vec<Option<String>> = cells
        .iter()
        .map(|cell| cell.as_ref().map(ToString::to_string))
        .collect();
    Column::new(name.into(), values)
}
