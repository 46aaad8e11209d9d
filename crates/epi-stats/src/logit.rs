//! Logistic regression by Newton-Raphson (IRLS).

use ndarray::{Array1, Array2, Axis};
use tracing::debug;

use crate::design::Design;
use crate::error::{FitError, Result};
use crate::inference::{Coefficient, Reference};
use crate::linalg::spd_inverse;

/// Newton iteration limits.
#[derive(Debug, Clone, Copy)]
pub struct LogitConfig {
    pub max_iterations: usize,
    /// Convergence threshold on the largest absolute coefficient update.
    pub tolerance: f64,
}

impl Default for LogitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 35,
            tolerance: 1e-8,
        }
    }
}

/// Coefficient table of a logistic fit; coefficients are log odds.
#[derive(Debug, Clone)]
pub struct LogitFit {
    pub coefficients: Vec<Coefficient>,
    pub n_obs: usize,
    pub iterations: usize,
    pub log_likelihood: f64,
}

/// Fit a 0/1 `response` on `design` by maximum likelihood.
pub fn fit_logit(design: &Design, response: &[f64], config: LogitConfig) -> Result<LogitFit> {
    design.check_response(response.len())?;
    if response.iter().any(|value| *value != 0.0 && *value != 1.0) {
        return Err(FitError::InvalidResponse(
            "logistic outcome must be coded 0/1".to_string(),
        ));
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
    let mut beta = Array1::<f64>::zeros(n_terms);

    for iteration in 1..=config.max_iterations {
        let p = probabilities(x, &beta);
        let weights = &p * &(1.0 - &p);
        let information = weighted_gram(x, &weights);
        let covariance = spd_inverse(&information).map_err(|e| design.singular(e))?;
        let gradient = x.t().dot(&(&y - &p));
        let step = covariance.dot(&gradient);
        beta += &step;

        if !beta.iter().all(|b| b.is_finite()) {
            return Err(FitError::NotConverged {
                iterations: iteration,
            });
        }
        let largest = step.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()));
        if largest < config.tolerance {
            let p = probabilities(x, &beta);
            let information = weighted_gram(x, &(&p * &(1.0 - &p)));
            let covariance = spd_inverse(&information).map_err(|e| design.singular(e))?;
            let log_likelihood = log_likelihood(&y, &p);
            let coefficients = design
                .terms()
                .iter()
                .enumerate()
                .map(|(j, term)| {
                    Reference::Normal.coefficient(term, beta[j], covariance[[j, j]].sqrt())
                })
                .collect::<Result<Vec<_>>>()?;
            debug!(n_obs, iterations = iteration, log_likelihood, "logit fitted");
            return Ok(LogitFit {
                coefficients,
                n_obs,
                iterations: iteration,
                log_likelihood,
            });
        }
    }

    Err(FitError::NotConverged {
        iterations: config.max_iterations,
    })
}

fn probabilities(x: &Array2<f64>, beta: &Array1<f64>) -> Array1<f64> {
    x.dot(beta).mapv(|eta| 1.0 / (1.0 + (-eta).exp()))
}

/// `Xᵀ diag(w) X`.
fn weighted_gram(x: &Array2<f64>, weights: &Array1<f64>) -> Array2<f64> {
    let weighted = x * &weights.view().insert_axis(Axis(1));
    x.t().dot(&weighted)
}

fn log_likelihood(y: &Array1<f64>, p: &Array1<f64>) -> f64 {
    y.iter()
        .zip(p.iter())
        .map(|(&yi, &pi)| {
            let pi = pi.clamp(f64::MIN_POSITIVE, 1.0 - f64::EPSILON);
            yi * pi.ln() + (1.0 - yi) * (1.0 - pi).ln()
        })
        .sum()
}
