//! Typed configuration documents.
//!
//! Two YAML documents drive a run: the project document (`project`, `data`,
//! `analysis`, `output`) and the fields document (`fields`: cleaning rules).
//! Structural validation and placeholder detection happen on the raw YAML
//! tree before these types are deserialized.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::outcome::OutcomeSpec;
use crate::scalar::Scalar;

/// Marker left in unfilled configuration templates.
pub const PLACEHOLDER_MARKER: &str = "REPLACE_ME";

const DEFAULT_SEED: u64 = 42;
const DEFAULT_DROPNA_STRATEGY: &str = "modelwise";
const DEFAULT_MIN_ROWS: usize = 30;

/// The project document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project: ProjectSection,
    pub data: DataSection,
    pub analysis: AnalysisSection,
    pub output: OutputSection,
}

impl ProjectConfig {
    pub fn outcome(&self) -> &OutcomeSpec {
        &self.analysis.outcome
    }

    pub fn exposure_columns(&self) -> &[String] {
        &self.analysis.exposure.columns
    }

    pub fn covariate_columns(&self) -> &[String] {
        &self.analysis.covariates.columns
    }

    /// Columns eligible for standardization: exposures then covariates, never outcome columns.
    pub fn standardize_columns(&self) -> Vec<String> {
        let outcome = self.outcome().required_columns();
        let mut columns: Vec<String> = Vec::new();
        for name in self.exposure_columns().iter().chain(self.covariate_columns()) {
            if !outcome.contains(name) && !columns.contains(name) {
                columns.push(name.clone());
            }
        }
        columns
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSection {
    pub name: String,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSection {
    pub input_path: PathBuf,
    pub format: String,
    #[serde(default)]
    pub id_column: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub outcome: OutcomeSpec,
    #[serde(default)]
    pub exposure: ColumnList,
    #[serde(default)]
    pub covariates: ColumnList,
    #[serde(default)]
    pub options: AnalysisOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnList {
    #[serde(default)]
    pub columns: Vec<String>,
}

/// `analysis.options`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Z-score exposure and covariate columns before cohort construction.
    #[serde(default)]
    pub standardize_numeric: bool,
    /// Missing-data policy name; validated by the cohort builder.
    #[serde(default = "default_dropna_strategy")]
    pub dropna_strategy: String,
    /// Smallest analysis cohort allowed to proceed to model fitting.
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            standardize_numeric: false,
            dropna_strategy: default_dropna_strategy(),
            min_rows: DEFAULT_MIN_ROWS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub table_dir: PathBuf,
    #[serde(default)]
    pub model_dir: Option<PathBuf>,
    #[serde(default)]
    pub figure_dir: Option<PathBuf>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// The fields document; a document without `fields` means no cleaning rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldsDocument {
    #[serde(default)]
    pub fields: FieldConfig,
}

/// Column-level cleaning rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Old column name to new column name.
    #[serde(default)]
    pub rename_map: BTreeMap<String, String>,
    /// Sentinel values nulled in every column.
    #[serde(default)]
    pub missing_codes: Vec<Scalar>,
    /// Per-column value remapping.
    #[serde(default)]
    pub category_maps: BTreeMap<String, CategoryMap>,
    /// Per-column clip bounds.
    #[serde(default)]
    pub numeric_bounds: BTreeMap<String, Bounds>,
}

/// Clip range for one column; a missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default)]
    pub lower: Option<f64>,
    #[serde(default)]
    pub upper: Option<f64>,
}

impl Bounds {
    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self { lower, upper }
    }

    pub fn lower_or_unbounded(&self) -> f64 {
        self.lower.unwrap_or(f64::NEG_INFINITY)
    }

    pub fn upper_or_unbounded(&self) -> f64 {
        self.upper.unwrap_or(f64::INFINITY)
    }
}

/// Value-to-value dictionary for one column, in document order.
///
/// Keys may be numbers, text or booleans, so this is an ordered list of pairs
/// rather than a map keyed by a hashable type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMap {
    entries: Vec<(Scalar, Scalar)>,
}

impl CategoryMap {
    pub fn from_entries(entries: Vec<(Scalar, Scalar)>) -> Self {
        Self { entries }
    }

    /// Replacement for `value`, if the dictionary has a matching key.
    pub fn lookup(&self, value: &Scalar) -> Option<&Scalar> {
        self.entries
            .iter()
            .find(|(key, _)| key.loosely_eq(value))
            .map(|(_, replacement)| replacement)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for CategoryMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = CategoryMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping from category values to replacement values")
            }

            fn visit_map<A>(self, mut map: A) -> Result<CategoryMap, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<Scalar, Scalar>()? {
                    entries.push((key, value));
                }
                Ok(CategoryMap { entries })
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl Serialize for CategoryMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.entries.iter().map(|(key, value)| (key, value)))
    }
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_dropna_strategy() -> String {
    DEFAULT_DROPNA_STRATEGY.to_string()
}

fn default_min_rows() -> usize {
    DEFAULT_MIN_ROWS
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"
project:
  name: demo
data:
  input_path: data/demo.csv
  format: csv
analysis:
  outcome:
    type: binary
    column: y
  exposure:
    columns: [x, age]
  covariates:
    columns: [age, sex, y]
output:
  table_dir: out/tables
"#;

    #[test]
    fn project_defaults_apply() {
        let config: ProjectConfig = serde_yaml::from_str(PROJECT).expect("parse project");
        assert_eq!(config.project.seed, 42);
        assert_eq!(config.analysis.options.dropna_strategy, "modelwise");
        assert_eq!(config.analysis.options.min_rows, 30);
        assert!(!config.analysis.options.standardize_numeric);
        assert!(config.output.log_file.is_none());
    }

    #[test]
    fn standardize_columns_skip_outcome_and_duplicates() {
        let config: ProjectConfig = serde_yaml::from_str(PROJECT).expect("parse project");
        assert_eq!(config.standardize_columns(), vec!["x", "age", "sex"]);
    }

    #[test]
    fn category_map_accepts_numeric_keys() {
        let yaml = "fields:\n  category_maps:\n    sex:\n      0: female\n      1: male\n";
        let document: FieldsDocument = serde_yaml::from_str(yaml).expect("parse fields");
        let map = &document.fields.category_maps["sex"];
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.lookup(&Scalar::Float(1.0)),
            Some(&Scalar::Text("male".to_string()))
        );
        assert_eq!(map.lookup(&Scalar::Int(2)), None);
    }

    #[test]
    fn empty_fields_document_has_no_rules() {
        let document: FieldsDocument = serde_yaml::from_str("{}").expect("parse fields");
        assert!(document.fields.rename_map.is_empty());
        assert!(document.fields.missing_codes.is_empty());
    }

    #[test]
    fn bounds_default_to_unbounded() {
        let bounds = Bounds::new(Some(0.0), None);
        assert_eq!(bounds.lower_or_unbounded(), 0.0);
        assert_eq!(bounds.upper_or_unbounded(), f64::INFINITY);
    }
}
