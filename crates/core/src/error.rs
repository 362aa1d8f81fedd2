//! Error types for the core domain.

use std::path::PathBuf;
use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("csv parse error: {0}")]
    Csv(String),

    #[error("CSV file has no data: {}", .0.display())]
    EmptyCsv(PathBuf),

    #[error("conversion error: {0}")]
    Convert(String),

    #[error("unknown resource: {0}")]
    UnknownResource(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
