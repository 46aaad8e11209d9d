//! Records produced by a pipeline run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ProjectSection;
use crate::outcome::OutcomeKind;

/// Model family that produced a result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Linear,
    Logistic,
    Cox,
}

impl ModelType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Logistic => "logistic",
            Self::Cox => "cox",
        }
    }

    /// Effect on the reporting scale: identity for linear, odds/hazard ratio otherwise.
    pub fn effect(self, coef: f64) -> f64 {
        match self {
            Self::Linear => coef,
            Self::Logistic | Self::Cox => coef.exp(),
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One coefficient of one fitted model.
///
/// `coef`, `lower_ci` and `upper_ci` share the model's native scale (log-odds
/// or log-hazard for logistic and Cox); only `effect` is transformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResult {
    pub model_type: ModelType,
    pub exposure: String,
    pub term: String,
    pub coef: f64,
    pub lower_ci: f64,
    pub upper_ci: f64,
    pub p_value: f64,
    pub effect: f64,
}

impl ModelResult {
    /// Build a result, deriving `effect` from the model type.
    pub fn new(
        model_type: ModelType,
        exposure: impl Into<String>,
        term: impl Into<String>,
        coef: f64,
        (lower_ci, upper_ci): (f64, f64),
        p_value: f64,
    ) -> Self {
        Self {
            model_type,
            exposure: exposure.into(),
            term: term.into(),
            coef,
            lower_ci,
            upper_ci,
            p_value,
            effect: model_type.effect(coef),
        }
    }
}

/// Row counts before and after cohort construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortFlow {
    pub input_rows: usize,
    pub analysis_rows: usize,
    pub excluded_rows: usize,
}

impl CohortFlow {
    pub fn new(input_rows: usize, analysis_rows: usize) -> Self {
        Self {
            input_rows,
            analysis_rows,
            excluded_rows: input_rows.saturating_sub(analysis_rows),
        }
    }

    /// Steps in report order, as written to `cohort_flow.csv`.
    pub fn steps(&self) -> [(&'static str, usize); 3] {
        [
            ("input_rows", self.input_rows),
            ("analysis_rows", self.analysis_rows),
            ("excluded_rows", self.excluded_rows),
        ]
    }
}

/// Missingness and cardinality of one dataset column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub column: String,
    pub dtype: String,
    pub n_missing: usize,
    pub missing_rate: f64,
    pub n_unique: usize,
}

/// Summary persisted to `run_metadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub project: ProjectSection,
    pub n_input: usize,
    pub n_analysis: usize,
    pub outcome_type: OutcomeKind,
    pub exposures: Vec<String>,
    pub generated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_is_identity_for_linear() {
        let result = ModelResult::new(ModelType::Linear, "x", "x", 0.4, (0.1, 0.7), 0.01);
        assert_eq!(result.effect, 0.4);
    }

    #[test]
    fn effect_is_exponentiated_for_ratio_models() {
        let logistic = ModelResult::new(ModelType::Logistic, "x", "x", 0.0, (-0.1, 0.1), 1.0);
        let cox = ModelResult::new(ModelType::Cox, "x", "x", 1.0_f64.ln(), (-0.1, 0.1), 1.0);
        assert_eq!(logistic.effect, 1.0);
        assert!((cox.effect - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cohort_flow_excluded_is_difference() {
        let flow = CohortFlow::new(500, 480);
        assert_eq!(flow.excluded_rows, 20);
        assert_eq!(flow.steps()[2], ("excluded_rows", 20));
    }

    #[test]
    fn model_type_serializes_lowercase() {
        let json = serde_json::to_string(&ModelType::Logistic).expect("serialize");
        assert_eq!(json, "\"logistic\"");
    }
}
