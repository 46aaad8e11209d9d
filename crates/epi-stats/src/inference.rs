//! Wald inference: p-values and confidence intervals.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::error::{FitError, Result};

/// Confidence level of every reported interval.
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// One estimated coefficient with its Wald statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficient {
    pub term: String,
    pub coef: f64,
    pub std_err: f64,
    /// t statistic for OLS, z statistic otherwise.
    pub statistic: f64,
    pub p_value: f64,
    pub lower_ci: f64,
    pub upper_ci: f64,
}

/// Reference distribution for the Wald statistic.
#[derive(Debug, Clone, Copy)]
pub enum Reference {
    StudentT { df: f64 },
    Normal,
}

impl Reference {
    /// Build a coefficient row from an estimate and its standard error.
    pub fn coefficient(self, term: &str, coef: f64, std_err: f64) -> Result<Coefficient> {
        let statistic = coef / std_err;
        let (p_value, (lower_ci, upper_ci)) = match self {
            Self::StudentT { df } => (
                pvalue_t(statistic, df)?,
                confidence_interval_t(coef, std_err, df)?,
            ),
            Self::Normal => (pvalue_z(statistic), confidence_interval_z(coef, std_err)),
        };
        Ok(Coefficient {
            term: term.to_string(),
            coef,
            std_err,
            statistic,
            p_value,
            lower_ci,
            upper_ci,
        })
    }
}

fn students_t(df: f64) -> Result<StudentsT> {
    StudentsT::new(0.0, 1.0, df).map_err(|e| FitError::Distribution(e.to_string()))
}

/// Two-sided p-value of a t statistic.
pub fn pvalue_t(statistic: f64, df: f64) -> Result<f64> {
    if statistic.is_nan() {
        return Ok(f64::NAN);
    }
    Ok(2.0 * students_t(df)?.sf(statistic.abs()))
}

/// Two-sided p-value of a z statistic.
pub fn pvalue_z(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    2.0 * Normal::standard().sf(statistic.abs())
}

pub fn confidence_interval_t(coef: f64, std_err: f64, df: f64) -> Result<(f64, f64)> {
    let critical = students_t(df)?.inverse_cdf(upper_tail_probability());
    Ok((coef - critical * std_err, coef + critical * std_err))
}

pub fn confidence_interval_z(coef: f64, std_err: f64) -> (f64, f64) {
    let critical = Normal::standard().inverse_cdf(upper_tail_probability());
    (coef - critical * std_err, coef + critical * std_err)
}

fn upper_tail_probability() -> f64 {
    1.0 - (1.0 - CONFIDENCE_LEVEL) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_interval_uses_1_96() {
        let (lower, upper) = confidence_interval_z(0.0, 1.0);
        assert!((upper - 1.959_963_984_540_054).abs() < 1e-6);
        assert!((lower + upper).abs() < 1e-12);
    }

    #[test]
    fn zero_statistic_has_p_value_one() {
        assert!((pvalue_z(0.0) - 1.0).abs() < 1e-12);
        assert!((pvalue_t(0.0, 10.0).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn t_interval_is_wider_than_normal() {
        let (_, t_upper) = confidence_interval_t(0.0, 1.0, 5.0).unwrap();
        let (_, z_upper) = confidence_interval_z(0.0, 1.0);
        assert!(t_upper > z_upper);
        // t(0.975, 5) = 2.5706
        assert!((t_upper - 2.570_582).abs() < 1e-4);
    }

    #[test]
    fn non_positive_df_is_rejected() {
        assert!(pvalue_t(1.0, 0.0).is_err());
    }
}
