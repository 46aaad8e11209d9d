//! Outcome families.
//!
//! The outcome specification is a tagged union: each variant carries the
//! columns it needs and determines which model family is fitted. Adding a new
//! family means adding a variant here and one arm in the dispatcher.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::results::ModelType;

/// Outcome configuration from `analysis.outcome`, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutcomeSpec {
    /// Continuous outcome modeled with ordinary least squares.
    Continuous { column: String },
    /// 0/1 outcome modeled with logistic regression.
    Binary { column: String },
    /// Time-to-event outcome modeled with Cox proportional hazards.
    Survival {
        time_column: String,
        event_column: String,
    },
}

impl OutcomeSpec {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Continuous { .. } => OutcomeKind::Continuous,
            Self::Binary { .. } => OutcomeKind::Binary,
            Self::Survival { .. } => OutcomeKind::Survival,
        }
    }

    /// Outcome columns the cohort must carry, in model order.
    pub fn required_columns(&self) -> Vec<String> {
        match self {
            Self::Continuous { column } | Self::Binary { column } => vec![column.clone()],
            Self::Survival {
                time_column,
                event_column,
            } => vec![time_column.clone(), event_column.clone()],
        }
    }

    pub fn model_type(&self) -> ModelType {
        self.kind().model_type()
    }
}

/// Outcome family without its columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Continuous,
    Binary,
    Survival,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 3] = [Self::Continuous, Self::Binary, Self::Survival];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Continuous => "continuous",
            Self::Binary => "binary",
            Self::Survival => "survival",
        }
    }

    /// Parse the configuration spelling (`continuous`, `binary`, `survival`).
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    pub fn model_type(self) -> ModelType {
        match self {
            Self::Continuous => ModelType::Linear,
            Self::Binary => ModelType::Logistic,
            Self::Survival => ModelType::Cox,
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
