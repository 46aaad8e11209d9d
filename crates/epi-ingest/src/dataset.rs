//! Dataset loading into Polars DataFrames.

use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use polars::prelude::{CsvReadOptions, DataFrame, NullValues, ParquetReader, SerReader};
use tracing::debug;

use epi_model::{PipelineError, Result};

/// Cell spellings read as missing in delimited files, besides the empty field.
pub const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Supported dataset formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Tsv,
    Parquet,
}

impl DataFormat {
    fn separator(self) -> Option<u8> {
        match self {
            Self::Csv => Some(b','),
            Self::Tsv => Some(b'\t'),
            Self::Parquet => None,
        }
    }
}

impl FromStr for DataFormat {
    type Err = PipelineError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "parquet" => Ok(Self::Parquet),
            _ => Err(PipelineError::UnsupportedFormat {
                format: value.to_string(),
            }),
        }
    }
}

/// Read a dataset in the configured format (`csv`, `tsv` or `parquet`).
///
/// Delimited files infer their schema from every row so a late decimal value
/// cannot turn an integer column into a parse failure. Cells spelled as one
/// of [`NULL_TOKENS`] are read as null in every column.
pub fn read_dataset(path: &Path, format: &str) -> Result<DataFrame> {
    let format: DataFormat = format.parse()?;
    std::fs::metadata(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let df = match format.separator() {
        Some(separator) => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .map_parse_options(|options| {
                options
                    .with_separator(separator)
                    .with_null_values(Some(null_values()))
            })
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        None => {
            let file = File::open(path).map_err(|source| PipelineError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            ParquetReader::new(file).finish()?
        }
    };

    debug!(
        path = %path.display(),
        format = ?format,
        rows = df.height(),
        columns = df.width(),
        "dataset read"
    );
    Ok(df)
}

fn null_values() -> NullValues {
    NullValues::AllColumns(NULL_TOKENS.iter().map(|token| (*token).into()).collect())
}
