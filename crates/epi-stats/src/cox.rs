//! Cox proportional hazards by partial likelihood, Efron tie handling.

use ndarray::{Array1, Array2, ArrayView1};
use tracing::debug;

use crate::design::Design;
use crate::error::{FitError, Result};
use crate::inference::Reference;
use crate::linalg::spd_inverse;

/// Newton iteration limits.
#[derive(Debug, Clone, Copy)]
pub struct CoxConfig {
    pub max_iterations: usize,
    /// Convergence threshold on the largest absolute coefficient update.
    pub tolerance: f64,
    /// Step halvings tried when an update lowers the partial likelihood.
    pub max_halvings: usize,
}

impl Default for CoxConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-9,
            max_halvings: 20,
        }
    }
}

/// One row of the Cox summary; `coef` is the log hazard ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct CoxTerm {
    pub covariate: String,
    pub coef: f64,
    pub exp_coef: f64,
    pub se_coef: f64,
    pub z: f64,
    pub p: f64,
    pub coef_lower_95: f64,
    pub coef_upper_95: f64,
}

#[derive(Debug, Clone)]
pub struct CoxFit {
    pub summary: Vec<CoxTerm>,
    pub n_obs: usize,
    pub n_events: usize,
    pub iterations: usize,
    pub log_partial_likelihood: f64,
}

impl CoxFit {
    pub fn term(&self, covariate: &str) -> Option<&CoxTerm> {
        self.summary.iter().find(|row| row.covariate == covariate)
    }
}

/// Fit a Cox model. `design` carries no intercept; `event` marks observed failures.
pub fn fit_cox(design: &Design, time: &[f64], event: &[bool], config: CoxConfig) -> Result<CoxFit> {
    design.check_response(time.len())?;
    design.check_response(event.len())?;
    if time.iter().any(|t| !t.is_finite()) {
        return Err(FitError::NonFinite {
            what: "time".to_string(),
        });
    }
    let n_events = event.iter().filter(|e| **e).count();
    if n_events == 0 {
        return Err(FitError::NoEvents);
    }
    let n_terms = design.n_terms();
    if n_events < n_terms {
        return Err(FitError::TooFewObservations {
            observations: n_events,
            parameters: n_terms,
        });
    }

    // Centering leaves coefficients unchanged and keeps exp(eta) in range.
    let mut x = design.matrix().clone();
    for mut column in x.columns_mut() {
        let mean = column.mean().unwrap_or(0.0);
        column -= mean;
    }
    let mut order: Vec<usize> = (0..time.len()).collect();
    order.sort_by(|a, b| time[*b].total_cmp(&time[*a]));
    let data = SurvivalData {
        x: &x,
        time,
        event,
        order: &order,
    };

    let mut beta = Array1::<f64>::zeros(n_terms);
    let mut current = data.efron(&beta);
    for iteration in 1..=config.max_iterations {
        let covariance = spd_inverse(&current.information).map_err(|e| design.singular(e))?;
        let mut step = covariance.dot(&current.gradient);

        let mut candidate = &beta + &step;
        let mut next = data.efron(&candidate);
        let mut halvings = 0;
        while !(next.log_likelihood >= current.log_likelihood) && halvings < config.max_halvings {
            step *= 0.5;
            candidate = &beta + &step;
            next = data.efron(&candidate);
            halvings += 1;
        }
        if !next.log_likelihood.is_finite() || !candidate.iter().all(|b| b.is_finite()) {
            return Err(FitError::NotConverged {
                iterations: iteration,
            });
        }
        beta = candidate;
        current = next;

        let largest = step.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()));
        if largest < config.tolerance {
            let covariance =
                spd_inverse(&current.information).map_err(|e| design.singular(e))?;
            let summary = design
                .terms()
                .iter()
                .enumerate()
                .map(|(j, term)| -> Result<CoxTerm> {
                    let row = Reference::Normal.coefficient(term, beta[j], covariance[[j, j]].sqrt())?;
                    Ok(CoxTerm {
                        covariate: row.term,
                        coef: row.coef,
                        exp_coef: row.coef.exp(),
                        se_coef: row.std_err,
                        z: row.statistic,
                        p: row.p_value,
                        coef_lower_95: row.lower_ci,
                        coef_upper_95: row.upper_ci,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            debug!(
                n_obs = design.n_obs(),
                n_events,
                iterations = iteration,
                log_partial_likelihood = current.log_likelihood,
                "cox fitted"
            );
            return Ok(CoxFit {
                summary,
                n_obs: design.n_obs(),
                n_events,
                iterations: iteration,
                log_partial_likelihood: current.log_likelihood,
            });
        }
    }

    Err(FitError::NotConverged {
        iterations: config.max_iterations,
    })
}

struct SurvivalData<'a> {
    x: &'a Array2<f64>,
    time: &'a [f64],
    event: &'a [bool],
    /// Row indices by descending time.
    order: &'a [usize],
}

struct PartialLikelihood {
    log_likelihood: f64,
    gradient: Array1<f64>,
    information: Array2<f64>,
}

impl SurvivalData<'_> {
    /// Efron log partial likelihood with its gradient and observed information.
    fn efron(&self, beta: &Array1<f64>) -> PartialLikelihood {
        let p = self.x.ncols();
        let eta = self.x.dot(beta);
        let risk = eta.mapv(f64::exp);

        let mut log_likelihood = 0.0;
        let mut gradient = Array1::<f64>::zeros(p);
        let mut information = Array2::<f64>::zeros((p, p));

        // Running sums over the risk set, which grows as time decreases.
        let mut s0 = 0.0;
        let mut s1 = Array1::<f64>::zeros(p);
        let mut s2 = Array2::<f64>::zeros((p, p));

        let mut start = 0;
        while start < self.order.len() {
            let t = self.time[self.order[start]];
            let mut end = start;
            while end < self.order.len() && self.time[self.order[end]] == t {
                end += 1;
            }

            let mut deaths = 0usize;
            let mut d0 = 0.0;
            let mut d1 = Array1::<f64>::zeros(p);
            let mut d2 = Array2::<f64>::zeros((p, p));
            for &i in &self.order[start..end] {
                let xi = self.x.row(i);
                let r = risk[i];
                let xx = outer(&xi);
                s0 += r;
                s1.scaled_add(r, &xi);
                s2.scaled_add(r, &xx);
                if self.event[i] {
                    deaths += 1;
                    d0 += r;
                    d1.scaled_add(r, &xi);
                    d2.scaled_add(r, &xx);
                    log_likelihood += eta[i];
                    gradient += &xi;
                }
            }

            for l in 0..deaths {
                let a = l as f64 / deaths as f64;
                let phi0 = s0 - a * d0;
                let phi1 = &s1 - &(&d1 * a);
                let phi2 = &s2 - &(&d2 * a);
                let mean = &phi1 / phi0;
                log_likelihood -= phi0.ln();
                gradient -= &mean;
                information += &(&phi2 / phi0 - outer(&mean.view()));
            }
            start = end;
        }

        PartialLikelihood {
            log_likelihood,
            gradient,
            information,
        }
    }
}

fn outer(v: &ArrayView1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((v.len(), v.len()), |(i, j)| v[i] * v[j])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design(x: Vec<f64>) -> Design {
        Design::from_columns(&[("x".to_string(), x)]).unwrap()
    }

    #[test]
    fn balanced_ties_give_null_effect() {
        let x = vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
        let time = vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0];
        let event = vec![true; 8];

        let fit = fit_cox(&design(x), &time, &event, CoxConfig::default()).unwrap();

        let row = fit.term("x").unwrap();
        assert!(row.coef.abs() < 1e-8);
        assert!((row.exp_coef - 1.0).abs() < 1e-8);
        assert!((row.p - 1.0).abs() < 1e-6);
        assert_eq!(fit.n_events, 8);
    }

    #[test]
    fn higher_risk_fails_earlier() {
        let x = vec![1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let time = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let event = vec![true, true, true, true, false, true, false, true, false, false];

        let fit = fit_cox(&design(x), &time, &event, CoxConfig::default()).unwrap();

        let row = fit.term("x").unwrap();
        assert!(row.coef > 0.0);
        assert!(row.coef_lower_95 < row.coef && row.coef < row.coef_upper_95);
    }

    #[test]
    fn all_censored_has_no_events() {
        let err = fit_cox(
            &design(vec![0.0, 1.0]),
            &[1.0, 2.0],
            &[false, false],
            CoxConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FitError::NoEvents));
    }

    #[test]
    fn constant_covariate_is_singular() {
        let err = fit_cox(
            &design(vec![1.0, 1.0, 1.0]),
            &[1.0, 2.0, 3.0],
            &[true, true, true],
            CoxConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FitError::Singular { term } if term == "x"));
    }
}
