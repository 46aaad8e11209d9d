//! Artifact writers.

use std::fs::{self, File};
use std::path::Path;

use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use tracing::debug;

use epi_model::{PipelineError, Result, RunMetadata};

/// Write a frame as CSV with a header row, creating parent directories.
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(|source| io_error(path, source))?;
    CsvWriter::new(file).include_header(true).finish(df)?;
    debug!(path = %path.display(), rows = df.height(), "table written");
    Ok(())
}

/// Write run metadata as pretty-printed JSON, creating parent directories.
pub fn write_run_metadata(path: &Path, metadata: &RunMetadata) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(metadata)?;
    fs::write(path, format!("{json}\n")).map_err(|source| io_error(path, source))?;
    debug!(path = %path.display(), "run metadata written");
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.to_path_buf(),
        source,
    }
}
