//! Ordinary least squares.

use ndarray::Array1;
use tracing::debug;

use crate::design::Design;
use crate::error::{FitError, Result};
use crate::inference::{Coefficient, Reference};
use crate::linalg::spd_inverse;

/// Coefficient table of an OLS fit.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coefficients: Vec<Coefficient>,
    pub n_obs: usize,
    pub df_resid: usize,
    pub r_squared: f64,
}

/// Fit `response` on `design` by the normal equations.
///
/// Intervals and p-values use the t distribution with `n - p` degrees of freedom.
pub fn fit_ols(design: &Design, response: &[f64]) -> Result<OlsFit> {
    design.check_response(response.len())?;
    if response.iter().any(|value| !value.is_finite()) {
        return Err(FitError::NonFinite {
            what: "response".to_string(),
        });
    }
    let (n_obs, n_terms) = (design.n_obs(), design.n_terms());
    if n_obs <= n_terms {
        return Err(FitError::TooFewObservations {
            observations: n_obs,
            parameters: n_terms,
        });
    }

    let x = design.matrix();
    let y = Array1::from(response.to_vec());
    let xtx_inv = spd_inverse(&x.t().dot(x)).map_err(|e| design.singular(e))?;
    let beta = xtx_inv.dot(&x.t().dot(&y));

    let residuals = &y - &x.dot(&beta);
    let rss = residuals.dot(&residuals);
    let df_resid = n_obs - n_terms;
    let sigma2 = rss / df_resid as f64;
    let mean = y.mean().unwrap_or(0.0);
    let tss = y.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { f64::NAN };

    let reference = Reference::StudentT {
        df: df_resid as f64,
    };
    let coefficients = design
        .terms()
        .iter()
        .enumerate()
        .map(|(j, term)| reference.coefficient(term, beta[j], (sigma2 * xtx_inv[[j, j]]).sqrt()))
        .collect::<Result<Vec<_>>>()?;

    debug!(n_obs, df_resid, r_squared, "ols fitted");
    Ok(OlsFit {
        coefficients,
        n_obs,
        df_resid,
        r_squared,
    })
}
