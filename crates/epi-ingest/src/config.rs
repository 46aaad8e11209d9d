//! Configuration loading and validation.
//!
//! Validation runs on the raw YAML tree so that every problem can be named by
//! its document path before anything is deserialized into typed structs.

use std::path::Path;

use serde_yaml::Value;
use tracing::debug;

use epi_model::{
    ConfigError, FieldConfig, FieldsDocument, OutcomeKind, PLACEHOLDER_MARKER, ProjectConfig,
};

/// Top-level sections every project document must define.
pub const REQUIRED_SECTIONS: [&str; 4] = ["project", "data", "analysis", "output"];

const SURVIVAL_COLUMNS: [&str; 2] = ["time_column", "event_column"];

/// Both configuration documents, validated and typed.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub project: ProjectConfig,
    pub fields: FieldConfig,
}

impl LoadedConfig {
    /// Read, validate and deserialize the project and fields documents.
    pub fn load(project_path: &Path, fields_path: &Path) -> Result<Self, ConfigError> {
        let project = load_yaml(project_path)?;
        let fields = load_yaml(fields_path)?;
        Self::from_documents(&project, &fields)
    }

    /// Validate already-parsed documents.
    ///
    /// Structural checks run first, then the placeholder scan over both
    /// documents; all placeholder paths are reported in a single error.
    pub fn from_documents(project: &Value, fields: &Value) -> Result<Self, ConfigError> {
        validate_project_config(project)?;

        let mut placeholders = find_placeholders(project);
        placeholders.extend(find_placeholders(fields));
        if !placeholders.is_empty() {
            return Err(ConfigError::Placeholders {
                paths: placeholders,
            });
        }

        let project: ProjectConfig =
            serde_yaml::from_value(project.clone()).map_err(|e| ConfigError::Invalid {
                document: "project".to_string(),
                message: e.to_string(),
            })?;
        let fields: FieldsDocument =
            serde_yaml::from_value(fields.clone()).map_err(|e| ConfigError::Invalid {
                document: "fields".to_string(),
                message: e.to_string(),
            })?;
        validate_field_config(&fields.fields)?;

        debug!(
            project = %project.project.name,
            outcome = %project.outcome().kind(),
            exposures = project.exposure_columns().len(),
            covariates = project.covariate_columns().len(),
            "configuration validated"
        );

        Ok(Self {
            project,
            fields: fields.fields,
        })
    }
}

/// Read a YAML document whose root must be a mapping.
pub fn load_yaml(path: &Path) -> Result<Value, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if !value.is_mapping() {
        return Err(ConfigError::NotAMapping {
            path: path.to_path_buf(),
        });
    }
    Ok(value)
}

/// Check required sections and the outcome specification of a project document.
pub fn validate_project_config(config: &Value) -> Result<(), ConfigError> {
    let missing: Vec<String> = REQUIRED_SECTIONS
        .iter()
        .filter(|key| config.get(**key).is_none())
        .map(|key| (*key).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::MissingKeys { keys: missing });
    }

    let Some(outcome) = config.get("analysis").and_then(|a| a.get("outcome")) else {
        return Err(missing_key("analysis.outcome"));
    };
    let Some(kind) = outcome.get("type") else {
        return Err(missing_key("analysis.outcome.type"));
    };
    let kind_text = scalar_text(kind);
    let kind = OutcomeKind::parse(&kind_text).ok_or(ConfigError::InvalidOutcomeType {
        value: kind_text,
    })?;

    match kind {
        OutcomeKind::Survival => {
            let invalid: Vec<String> = SURVIVAL_COLUMNS
                .iter()
                .filter(|key| !is_filled(outcome.get(**key)))
                .map(|key| (*key).to_string())
                .collect();
            if !invalid.is_empty() {
                return Err(ConfigError::InvalidSurvivalColumns { keys: invalid });
            }
        }
        OutcomeKind::Continuous | OutcomeKind::Binary => {
            if outcome.get("column").is_none_or(Value::is_null) {
                return Err(missing_key("analysis.outcome.column"));
            }
        }
    }
    Ok(())
}

/// Reject clip bounds whose lower side exceeds the upper side.
pub fn validate_field_config(fields: &FieldConfig) -> Result<(), ConfigError> {
    for (column, bounds) in &fields.numeric_bounds {
        if let (Some(lower), Some(upper)) = (bounds.lower, bounds.upper)
            && lower > upper
        {
            return Err(ConfigError::Invalid {
                document: "fields".to_string(),
                message: format!(
                    "numeric_bounds.{column}: lower ({lower}) is greater than upper ({upper})"
                ),
            });
        }
    }
    Ok(())
}

/// Every path whose string value contains the placeholder marker, in document order.
///
/// Mapping children are joined with `.`, sequence items with `[index]`.
pub fn find_placeholders(value: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_placeholders(value, "", &mut found);
    found
}

fn collect_placeholders(value: &Value, path: &str, found: &mut Vec<String>) {
    match value {
        Value::Mapping(mapping) => {
            for (key, child) in mapping {
                let key = scalar_text(key);
                let child_path = if path.is_empty() {
                    key
                } else {
                    format!("{path}.{key}")
                };
                collect_placeholders(child, &child_path, found);
            }
        }
        Value::Sequence(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_placeholders(child, &format!("{path}[{index}]"), found);
            }
        }
        Value::String(text) => {
            if text.contains(PLACEHOLDER_MARKER) {
                found.push(path.to_string());
            }
        }
        Value::Tagged(tagged) => collect_placeholders(&tagged.value, path, found),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(value) => {
            let text = scalar_text(value);
            !text.is_empty() && !text.starts_with(PLACEHOLDER_MARKER)
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim().to_string())
            .unwrap_or_default(),
    }
}

fn missing_key(key: &str) -> ConfigError {
    ConfigError::MissingKeys {
        keys: vec![key.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn sequence_paths_use_brackets() {
        let value = yaml("a:\n  b: [ok, REPLACE_ME_col]\n");
        assert_eq!(find_placeholders(&value), vec!["a.b[1]"]);
    }

    #[test]
    fn marker_may_appear_mid_string() {
        let value = yaml("path: /data/REPLACE_ME/file.csv\n");
        assert_eq!(find_placeholders(&value), vec!["path"]);
    }

    #[test]
    fn numeric_keys_are_spelled_plainly() {
        let value = yaml("maps:\n  sex:\n    1: REPLACE_ME\n");
        assert_eq!(find_placeholders(&value), vec!["maps.sex.1"]);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let document: FieldsDocument =
            serde_yaml::from_str("fields:\n  numeric_bounds:\n    bmi: {lower: 60, upper: 10}\n")
                .unwrap();
        let err = validate_field_config(&document.fields).unwrap_err();
        assert!(err.to_string().contains("numeric_bounds.bmi"));
    }
}
