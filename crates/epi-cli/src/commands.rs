use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use epi_cli::logging::{LogConfig, build_dispatch};
use epi_core::{PreparedRun, RunContext, RunSummary};

use crate::cli::{ConfigArgs, RunArgs};

/// Load the configuration, then run it with logging sent to the resolved log file.
///
/// `--log-file` wins over `output.log_file`.
pub fn run_pipeline(args: &RunArgs, log_config: &LogConfig) -> Result<RunSummary> {
    let prepared = PreparedRun::load(&args.config.project, &args.config.fields)?;
    let log_file = log_config
        .log_file
        .clone()
        .or_else(|| prepared.log_file().map(Path::to_path_buf));
    let dispatch = build_dispatch(&log_config.clone().with_log_file(log_file))
        .context("failed to initialize logging")?;

    let mut ctx = RunContext::new().with_dispatch(dispatch);
    if let Some(seed) = args.seed {
        ctx = ctx.with_seed(seed);
    }
    Ok(prepared.execute(&ctx)?)
}

pub fn run_validate(args: &ConfigArgs, log_config: &LogConfig) -> Result<()> {
    let dispatch = build_dispatch(log_config).context("failed to initialize logging")?;
    tracing::dispatcher::with_default(&dispatch, || -> Result<()> {
        let prepared = PreparedRun::load(&args.project, &args.fields)?;
        info!(
            project = %prepared.config().project.name,
            outcome = %prepared.config().outcome().kind(),
            "configuration valid"
        );
        println!("configuration OK");
        Ok(())
    })
}
