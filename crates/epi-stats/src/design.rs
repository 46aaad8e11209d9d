//! Named design matrices.

use ndarray::{Array2, s};

use crate::error::{FitError, Result};
use crate::linalg::NotPositiveDefinite;

/// Name of the intercept term added by [`Design::with_intercept`].
pub const INTERCEPT: &str = "const";

/// Row-major design matrix with one name per column.
#[derive(Debug, Clone)]
pub struct Design {
    terms: Vec<String>,
    matrix: Array2<f64>,
}

impl Design {
    /// Build a design from named columns of equal length.
    pub fn from_columns(columns: &[(String, Vec<f64>)]) -> Result<Self> {
        let Some((_, first)) = columns.first() else {
            return Err(FitError::EmptyDesign);
        };
        let n_obs = first.len();
        for (term, values) in columns {
            if values.len() != n_obs {
                return Err(FitError::DimensionMismatch {
                    response: n_obs,
                    design: values.len(),
                });
            }
            if values.iter().any(|value| !value.is_finite()) {
                return Err(FitError::NonFinite { what: term.clone() });
            }
        }
        let matrix = Array2::from_shape_fn((n_obs, columns.len()), |(row, col)| {
            columns[col].1[row]
        });
        Ok(Self {
            terms: columns.iter().map(|(term, _)| term.clone()).collect(),
            matrix,
        })
    }

    /// Prepend a column of ones named [`INTERCEPT`].
    pub fn with_intercept(self) -> Self {
        let (n_obs, n_terms) = self.matrix.dim();
        let mut matrix = Array2::<f64>::ones((n_obs, n_terms + 1));
        matrix.slice_mut(s![.., 1..]).assign(&self.matrix);
        let mut terms = Vec::with_capacity(n_terms + 1);
        terms.push(INTERCEPT.to_string());
        terms.extend(self.terms);
        Self { terms, matrix }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn n_obs(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn n_terms(&self) -> usize {
        self.matrix.ncols()
    }

    pub(crate) fn singular(&self, err: NotPositiveDefinite) -> FitError {
        FitError::Singular {
            term: self
                .terms
                .get(err.pivot)
                .cloned()
                .unwrap_or_else(|| format!("#{}", err.pivot)),
        }
    }

    pub(crate) fn check_response(&self, response_len: usize) -> Result<()> {
        if response_len != self.n_obs() {
            return Err(FitError::DimensionMismatch {
                response: response_len,
                design: self.n_obs(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intercept_is_first() {
        let design = Design::from_columns(&[("x".to_string(), vec![1.0, 2.0])])
            .unwrap()
            .with_intercept();
        assert_eq!(design.terms(), ["const", "x"]);
        assert_eq!(design.matrix()[[1, 0]], 1.0);
        assert_eq!(design.matrix()[[1, 1]], 2.0);
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let err = Design::from_columns(&[
            ("x".to_string(), vec![1.0, 2.0]),
            ("z".to_string(), vec![1.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, FitError::DimensionMismatch { .. }));
    }

    #[test]
    fn nan_is_rejected() {
        let err = Design::from_columns(&[("x".to_string(), vec![1.0, f64::NAN])]).unwrap_err();
        assert!(matches!(err, FitError::NonFinite { what } if what == "x"));
    }
}
