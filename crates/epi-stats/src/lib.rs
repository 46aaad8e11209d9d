//! Regression fitting for the cohort regression pipeline.
//!
//! Three model families, each returning its own coefficient table:
//!
//! - **ols**: ordinary least squares, t-based intervals
//! - **logit**: logistic maximum likelihood by Newton-Raphson, Wald intervals
//! - **cox**: Cox proportional hazards with Efron ties, Wald intervals
//!
//! All intervals are 95%. Designs are named column sets; OLS and logistic
//! designs carry an explicit intercept term named [`INTERCEPT`].

pub mod cox;
pub mod design;
pub mod error;
pub mod inference;
pub mod linalg;
pub mod logit;
pub mod ols;

pub use cox::{CoxConfig, CoxFit, CoxTerm, fit_cox};
pub use design::{Design, INTERCEPT};
pub use error::{FitError, Result};
pub use inference::{
    CONFIDENCE_LEVEL, Coefficient, Reference, confidence_interval_t, confidence_interval_z,
    pvalue_t, pvalue_z,
};
pub use logit::{LogitConfig, LogitFit, fit_logit};
pub use ols::{OlsFit, fit_ols};
