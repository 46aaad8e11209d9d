//! Scalar values written in configuration documents.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single configuration value: a missing code, a category key or a category label.
///
/// Numeric scalars compare by value regardless of integer/float spelling, text
/// compares exactly and booleans only match booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Numeric value for `Int` and `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// True for integers and for floats without a fractional part.
    pub fn is_integral(&self) -> bool {
        match self {
            Self::Int(_) => true,
            Self::Float(value) => value.is_finite() && value.fract() == 0.0,
            Self::Bool(_) | Self::Text(_) => false,
        }
    }

    /// Value equality with numeric coercion between `Int` and `Float`.
    pub fn loosely_eq(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_scalars_compare_by_value() {
        assert!(Scalar::Int(1).loosely_eq(&Scalar::Float(1.0)));
        assert!(!Scalar::Int(1).loosely_eq(&Scalar::Float(1.5)));
        assert!(!Scalar::Int(1).loosely_eq(&Scalar::Text("1".to_string())));
        assert!(!Scalar::Bool(true).loosely_eq(&Scalar::Int(1)));
    }

    #[test]
    fn integral_floats_are_integral() {
        assert!(Scalar::Float(3.0).is_integral());
        assert!(!Scalar::Float(3.5).is_integral());
        assert!(!Scalar::Float(f64::NAN).is_integral());
    }

    #[test]
    fn display_is_plain() {
        assert_eq!(Scalar::Int(-9).to_string(), "-9");
        assert_eq!(Scalar::Float(2.5).to_string(), "2.5");
        assert_eq!(Scalar::Text("male".to_string()).to_string(), "male");
    }
}
