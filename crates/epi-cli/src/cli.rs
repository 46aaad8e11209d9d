//! CLI argument definitions for the cohort regression pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "epi",
    version,
    about = "Cohort regression pipeline - fit exposure models from a YAML configuration",
    long_about = "Fit one regression model per exposure from two YAML documents.\n\n\
                  The project document names the dataset, the outcome family (continuous,\n\
                  binary or survival), exposures, covariates and output directories. The\n\
                  fields document holds the column cleaning rules."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to this file as well as stderr (overrides output.log_file).
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline and write the result tables.
    Run(RunArgs),

    /// Check both configuration documents without reading the dataset.
    Validate(ConfigArgs),
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Project document (project, data, analysis, output).
    #[arg(long = "project", value_name = "PATH")]
    pub project: PathBuf,

    /// Fields document (cleaning rules).
    #[arg(long = "fields", value_name = "PATH")]
    pub fields: PathBuf,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Seed for the run (overrides project.seed).
    #[arg(long = "seed", value_name = "N")]
    pub seed: Option<u64>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_accepts_seed_and_global_flags() {
        let cli = Cli::try_parse_from([
            "epi",
            "run",
            "--project",
            "config/project.yaml",
            "--fields",
            "config/fields.yaml",
            "--seed",
            "7",
            "--log-format",
            "json",
        ])
        .unwrap();

        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.config.project, PathBuf::from("config/project.yaml"));
        assert!(matches!(cli.log_format, LogFormatArg::Json));
    }

    #[test]
    fn validate_requires_both_documents() {
        assert!(Cli::try_parse_from(["epi", "validate", "--project", "p.yaml"]).is_err());
    }
}
