//! Ingestion errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for ingestion.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur while reading input files.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Malformed input, including records of unequal length.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Unreadable or corrupt Parquet input.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// The input could not be assembled into a table.
    #[error(transparent)]
    Table(#[from] tabpipe_core::Error),

    /// The input file could not be opened.
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input had no header record.
    #[error("input is empty")]
    Empty,

    /// A Parquet column holds repeated values, which a flat column cannot.
    #[error("repeated column {0} is not supported")]
    Repeated(String),

    /// The delimiter is not a single byte.
    #[error("delimiter must be a single byte, got {0:?}")]
    Delimiter(char),
}
