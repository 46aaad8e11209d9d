//! Dense symmetric positive-definite inversion.

use ndarray::Array2;

/// Cholesky factorization broke down at `pivot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotPositiveDefinite {
    pub pivot: usize,
}

/// Relative size below which a Cholesky pivot counts as zero.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Lower-triangular `L` with `L Lᵀ = a`.
pub fn cholesky(a: &Array2<f64>) -> Result<Array2<f64>, NotPositiveDefinite> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        let mut diag = a[[j, j]];
        for k in 0..j {
            diag -= l[[j, k]] * l[[j, k]];
        }
        if !diag.is_finite() || diag <= PIVOT_TOLERANCE * a[[j, j]].abs() {
            return Err(NotPositiveDefinite { pivot: j });
        }
        let root = diag.sqrt();
        l[[j, j]] = root;
        for i in (j + 1)..n {
            let mut value = a[[i, j]];
            for k in 0..j {
                value -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = value / root;
        }
    }
    Ok(l)
}

/// Inverse of a symmetric positive-definite matrix.
pub fn spd_inverse(a: &Array2<f64>) -> Result<Array2<f64>, NotPositiveDefinite> {
    let l = cholesky(a)?;
    let n = l.nrows();
    let mut inverse = Array2::<f64>::zeros((n, n));
    for col in 0..n {
        // Forward: L z = e_col
        let mut z = vec![0.0; n];
        for i in 0..n {
            let mut value = if i == col { 1.0 } else { 0.0 };
            for k in 0..i {
                value -= l[[i, k]] * z[k];
            }
            z[i] = value / l[[i, i]];
        }
        // Backward: Lᵀ x = z
        for i in (0..n).rev() {
            let mut value = z[i];
            for k in (i + 1)..n {
                value -= l[[k, i]] * inverse[[k, col]];
            }
            inverse[[i, col]] = value / l[[i, i]];
        }
    }
    Ok(inverse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn inverse_of_known_matrix() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let inv = spd_inverse(&a).unwrap();
        let identity = a.dot(&inv);
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((identity[[i, j]] - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn collinear_matrix_reports_pivot() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        assert_eq!(spd_inverse(&a).unwrap_err(), NotPositiveDefinite { pivot: 1 });
    }
}
