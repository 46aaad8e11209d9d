//! Pipeline orchestration.
//!
//! A run is split into loading ([`PreparedRun::load`]) and execution
//! ([`PreparedRun::execute`]) so that callers can inspect the validated
//! configuration, for example to open `output.log_file`, before any stage
//! logs.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use epi_ingest::{LoadedConfig, read_dataset};
use epi_model::{
    CohortFlow, ColumnProfile, FieldConfig, ModelResult, PipelineError, ProjectConfig,
    ProjectSection, Result, RunMetadata,
};
use epi_report::{
    cohort_flow_frame, model_summary_frame, profile_frame, write_run_metadata, write_table,
};
use epi_transform::build_cleaning_pipeline;

use crate::cohort::{build_model_dataset, ensure_min_rows};
use crate::context::RunContext;
use crate::dispatch::fit_exposures;
use crate::report::{cohort_flow, profile_columns};

pub const MODEL_SUMMARY_FILE: &str = "model_summary.csv";
pub const COHORT_FLOW_FILE: &str = "cohort_flow.csv";
pub const DATA_PROFILE_FILE: &str = "data_profile.csv";
pub const RUN_METADATA_FILE: &str = "run_metadata.json";

/// Locations of the files a run writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model_summary: PathBuf,
    pub cohort_flow: PathBuf,
    pub data_profile: PathBuf,
    pub run_metadata: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(table_dir: &Path) -> Self {
        Self {
            model_summary: table_dir.join(MODEL_SUMMARY_FILE),
            cohort_flow: table_dir.join(COHORT_FLOW_FILE),
            data_profile: table_dir.join(DATA_PROFILE_FILE),
            run_metadata: table_dir.join(RUN_METADATA_FILE),
        }
    }

    fn files(&self) -> [&PathBuf; 4] {
        [
            &self.model_summary,
            &self.cohort_flow,
            &self.data_profile,
            &self.run_metadata,
        ]
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub results: Vec<ModelResult>,
    pub cohort_flow: CohortFlow,
    pub artifacts: ArtifactPaths,
    pub seed: u64,
}

/// Validated configuration, ready to execute.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    config: LoadedConfig,
}

impl PreparedRun {
    /// Load and validate both configuration documents.
    pub fn load(project_path: &Path, fields_path: &Path) -> Result<Self> {
        let config = LoadedConfig::load(project_path, fields_path)?;
        Ok(Self { config })
    }

    pub fn from_config(config: LoadedConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config.project
    }

    pub fn fields(&self) -> &FieldConfig {
        &self.config.fields
    }

    /// `output.log_file`, if configured.
    pub fn log_file(&self) -> Option<&Path> {
        self.config.project.output.log_file.as_deref()
    }

    /// Run every stage inside the context's logging scope.
    pub fn execute(&self, ctx: &RunContext) -> Result<RunSummary> {
        ctx.in_scope(|| self.run(ctx))
    }

    fn run(&self, ctx: &RunContext) -> Result<RunSummary> {
        let project = &self.config.project;
        let seed = ctx.effective_seed(project.project.seed);
        info!(project = %project.project.name, seed, "run started");

        let raw = read_dataset(&project.data.input_path, &project.data.format)?;
        info!(
            path = %project.data.input_path.display(),
            rows = raw.height(),
            columns = raw.width(),
            "dataset loaded"
        );

        let standardize = if project.analysis.options.standardize_numeric {
            project.standardize_columns()
        } else {
            Vec::new()
        };
        let cleaned = build_cleaning_pipeline(&self.config.fields, &standardize).execute(&raw)?;
        let profiles = profile_columns(&cleaned)?;

        let cohort = build_model_dataset(
            &cleaned,
            &project.outcome().required_columns(),
            project.exposure_columns(),
            project.covariate_columns(),
            &project.analysis.options.dropna_strategy,
        )?;
        ensure_min_rows(&cohort, project.analysis.options.min_rows)?;
        let flow = cohort_flow(&cleaned, &cohort);
        info!(
            input_rows = flow.input_rows,
            analysis_rows = flow.analysis_rows,
            excluded_rows = flow.excluded_rows,
            "cohort built"
        );

        let results = fit_exposures(
            &cohort,
            project.outcome(),
            project.exposure_columns(),
            project.covariate_columns(),
        )?;

        let metadata = RunMetadata {
            project: ProjectSection {
                name: project.project.name.clone(),
                seed,
            },
            n_input: cleaned.height(),
            n_analysis: cohort.height(),
            outcome_type: project.outcome().kind(),
            exposures: project.exposure_columns().to_vec(),
            generated_at: Utc::now().to_rfc3339(),
        };
        let artifacts = ArtifactPaths::in_dir(&project.output.table_dir);
        self.write_artifacts(&artifacts, &results, &flow, &profiles, &metadata)?;

        info!(
            table_dir = %project.output.table_dir.display(),
            results = results.len(),
            "pipeline complete"
        );
        Ok(RunSummary {
            results,
            cohort_flow: flow,
            artifacts,
            seed,
        })
    }

    fn write_artifacts(
        &self,
        artifacts: &ArtifactPaths,
        results: &[ModelResult],
        flow: &CohortFlow,
        profiles: &[ColumnProfile],
        metadata: &RunMetadata,
    ) -> Result<()> {
        let project = &self.config.project;
        for dir in [&project.output.model_dir, &project.output.figure_dir]
            .into_iter()
            .flatten()
        {
            fs::create_dir_all(dir).map_err(|source| PipelineError::Io {
                path: dir.clone(),
                source,
            })?;
        }

        // Artifacts are staged next to their targets so a failed write
        // leaves no partial set behind.
        let staging = project
            .output
            .table_dir
            .join(format!(".staging-{}", std::process::id()));
        let staged = ArtifactPaths::in_dir(&staging);
        let written = write_staged(&staged, results, flow, profiles, metadata)
            .and_then(|()| commit_staged(&staged, artifacts));
        if staging.exists()
            && let Err(error) = fs::remove_dir_all(&staging)
        {
            warn!(path = %staging.display(), %error, "failed to remove staging directory");
        }
        written?;
        debug!(path = %artifacts.run_metadata.display(), "run metadata written");
        Ok(())
    }
}

fn write_staged(
    staged: &ArtifactPaths,
    results: &[ModelResult],
    flow: &CohortFlow,
    profiles: &[ColumnProfile],
    metadata: &RunMetadata,
) -> Result<()> {
    write_table(&mut model_summary_frame(results)?, &staged.model_summary)?;
    write_table(&mut cohort_flow_frame(flow)?, &staged.cohort_flow)?;
    write_table(&mut profile_frame(profiles)?, &staged.data_profile)?;
    write_run_metadata(&staged.run_metadata, metadata)
}

/// Move staged files into place. If a move fails, the files already moved
/// are removed again.
fn commit_staged(staged: &ArtifactPaths, artifacts: &ArtifactPaths) -> Result<()> {
    let targets = artifacts.files();
    for (index, (from, to)) in staged.files().into_iter().zip(targets).enumerate() {
        if let Err(source) = fs::rename(from, to) {
            for done in &targets[..index] {
                if let Err(error) = fs::remove_file(done) {
                    warn!(path = %done.display(), %error, "failed to remove artifact");
                }
            }
            return Err(PipelineError::Io {
                path: to.clone(),
                source,
            });
        }
    }
    Ok(())
}

/// Load, validate and execute a run in one call.
pub fn run_pipeline(project_path: &Path, fields_path: &Path, ctx: &RunContext) -> Result<RunSummary> {
    PreparedRun::load(project_path, fields_path)?.execute(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_are_fixed() {
        let paths = ArtifactPaths::in_dir(Path::new("out/tables"));
        assert_eq!(paths.model_summary, Path::new("out/tables/model_summary.csv"));
        assert_eq!(paths.cohort_flow, Path::new("out/tables/cohort_flow.csv"));
        assert_eq!(paths.data_profile, Path::new("out/tables/data_profile.csv"));
        assert_eq!(paths.run_metadata, Path::new("out/tables/run_metadata.json"));
    }
}
