//! Tests for written artifacts.

use std::fs;

use tempfile::TempDir;

use epi_model::{
    CohortFlow, ColumnProfile, ModelResult, ModelType, OutcomeKind, ProjectSection, RunMetadata,
};
use epi_report::{
    cohort_flow_frame, model_summary_frame, profile_frame, write_run_metadata, write_table,
};

#[test]
fn empty_model_summary_has_header_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tables").join("model_summary.csv");
    let mut df = model_summary_frame(&[]).unwrap();

    write_table(&mut df, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    insta::assert_snapshot!(text.trim_end(), @"model_type,exposure,term,coef,lower_ci,upper_ci,p_value,effect");
}

#[test]
fn model_summary_reads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model_summary.csv");
    let results = vec![ModelResult::new(
        ModelType::Logistic,
        "x",
        "x",
        0.5,
        (0.25, 0.75),
        0.001,
    )];
    let mut df = model_summary_frame(&results).unwrap();

    write_table(&mut df, &path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][0], "logistic");
    assert_eq!(&records[0][2], "x");
    let effect: f64 = records[0][7].parse().unwrap();
    assert!((effect - 0.5_f64.exp()).abs() < 1e-9);
}

#[test]
fn cohort_flow_csv_is_step_n() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cohort_flow.csv");
    let mut df = cohort_flow_frame(&CohortFlow::new(500, 487)).unwrap();

    write_table(&mut df, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    insta::assert_snapshot!(text.trim_end(), @r"
    step,n
    input_rows,500
    analysis_rows,487
    excluded_rows,13
    ");
}

#[test]
fn profile_csv_has_one_row_per_column() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data_profile.csv");
    let profiles = vec![
        ColumnProfile {
            column: "x".to_string(),
            dtype: "f64".to_string(),
            n_missing: 1,
            missing_rate: 0.25,
            n_unique: 3,
        },
        ColumnProfile {
            column: "sex".to_string(),
            dtype: "str".to_string(),
            n_missing: 0,
            missing_rate: 0.0,
            n_unique: 2,
        },
    ];
    let mut df = profile_frame(&profiles).unwrap();

    write_table(&mut df, &path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["column", "dtype", "n_missing", "missing_rate", "n_unique"]
    );
    assert_eq!(reader.records().count(), 2);
}

#[test]
fn run_metadata_is_pretty_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("run_metadata.json");
    let metadata = RunMetadata {
        project: ProjectSection {
            name: "demo".to_string(),
            seed: 42,
        },
        n_input: 500,
        n_analysis: 480,
        outcome_type: OutcomeKind::Binary,
        exposures: vec!["x".to_string()],
        generated_at: "2026-01-01T00:00:00+00:00".to_string(),
    };

    write_run_metadata(&path, &metadata).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    insta::assert_json_snapshot!(value, @r#"
    {
      "exposures": [
        "x"
      ],
      "generated_at": "2026-01-01T00:00:00+00:00",
      "n_analysis": 480,
      "n_input": 500,
      "outcome_type": "binary",
      "project": {
        "name": "demo",
        "seed": 42
      }
    }
    "#);
}
