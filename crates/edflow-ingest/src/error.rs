//! Error types for event extract ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading source extracts.
#[derive(Debug, Error)]
pub enum IngestError {
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to open or read a file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from the header row.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },
}

impl IngestError {
    pub(crate) fn open(path: &std::path::Path, source: csv::Error) -> Self {
        let path = path.to_path_buf();
        if !source.is_io_error() {
            return Self::CsvParse { path, source };
        }
        match source.into_kind() {
            csv::ErrorKind::Io(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Self::FileNotFound { path }
            }
            csv::ErrorKind::Io(error) => Self::FileRead {
                path,
                source: error,
            },
            _ => Self::FileRead {
                path,
                source: std::io::Error::other("csv reader failed"),
            },
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
