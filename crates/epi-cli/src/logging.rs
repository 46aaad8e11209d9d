//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! The CLI never installs a global subscriber for a run. It builds a
//! [`Dispatch`] that the run carries in its `RunContext`, so the run log can
//! be sent to the log file named in the project configuration.
//!
//! # Log Levels
//!
//! - `error`: fatal errors
//! - `warn`: dropped model terms and other non-fatal issues
//! - `info`: pipeline stage progress, row counts
//! - `debug`: cleaning step and writer detail
//! - `trace`: everything else
//!
//! # Usage
//!
//! ```ignore
//! use epi_cli::logging::{LogConfig, build_dispatch};
//!
//! let dispatch = build_dispatch(&LogConfig::default())?;
//! tracing::dispatcher::with_default(&dispatch, || tracing::info!("hello"));
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::Dispatch;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
};

/// Crates whose events follow the configured level; everything else stays at `warn`.
const WORKSPACE_CRATES: [&str; 7] = [
    "epi",
    "epi_cli",
    "epi_core",
    "epi_ingest",
    "epi_report",
    "epi_stats",
    "epi_transform",
];

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Maximum level for workspace crates.
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` replace the level-derived filter when it is set.
    pub use_env_filter: bool,
    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
    /// Whether to include target (module path) in log output.
    pub with_target: bool,
    /// Whether to use ANSI colors in output.
    pub with_ansi: bool,
    /// Output format.
    pub format: LogFormat,
    /// Optional log file. Events go to stderr and to the file.
    pub log_file: Option<PathBuf>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for machine parsing.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::INFO,
            use_env_filter: true,
            with_timestamps: true,
            with_target: false,
            with_ansi: false,
            format: LogFormat::default(),
            log_file: None,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_level(mut self, level_filter: LevelFilter) -> Self {
        self.level_filter = level_filter;
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, enable: bool) -> Self {
        self.use_env_filter = enable;
        self
    }

    #[must_use]
    pub fn with_timestamps(mut self, enable: bool) -> Self {
        self.with_timestamps = enable;
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the log file path (stderr only when None).
    #[must_use]
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }
}

/// Build a dispatcher for `config`, opening the log file when one is set.
///
/// The file's parent directories are created and the file is appended to.
/// ANSI colors are turned off whenever a file receives the events.
///
/// # Errors
///
/// Returns an error if the log file or its directory cannot be created.
pub fn build_dispatch(config: &LogConfig) -> io::Result<Dispatch> {
    match &config.log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let config = config.clone().with_ansi(false);
            Ok(build_dispatch_with_writer(
                &config,
                io::stderr.and(SharedFileWriter::new(file)),
            ))
        }
        None => Ok(build_dispatch_with_writer(config, io::stderr)),
    }
}

/// Build a dispatcher writing to a custom writer (useful for testing).
pub fn build_dispatch_with_writer<W>(config: &LogConfig, writer: W) -> Dispatch
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = build_env_filter(config);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(config.with_target);
            Dispatch::new(tracing_subscriber::registry().with(filter).with(layer))
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(config.with_target);
            if config.with_timestamps {
                Dispatch::new(tracing_subscriber::registry().with(filter).with(layer))
            } else {
                Dispatch::new(
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(layer.without_time()),
                )
            }
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(config.with_target);
            if config.with_timestamps {
                Dispatch::new(tracing_subscriber::registry().with(filter).with(layer))
            } else {
                Dispatch::new(
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(layer.without_time()),
                )
            }
        }
    }
}

#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl SharedFileWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

struct SharedFileGuard {
    file: Arc<Mutex<std::fs::File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            file: Arc::clone(&self.file),
        }
    }
}

fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let level_filter_directives = || {
        let level = config.level_filter.to_string().to_lowercase();
        let mut directives = vec!["warn".to_string()];
        directives.extend(WORKSPACE_CRATES.iter().map(|name| format!("{name}={level}")));
        EnvFilter::new(directives.join(","))
    };
    if config.use_env_filter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter_directives())
    } else {
        level_filter_directives()
    }
}
