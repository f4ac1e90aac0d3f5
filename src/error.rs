// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading data, reading configuration or exporting figures.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} has no column matching '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

/// Alias for fallible operations outside the render callback
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Failures the time-series branch degrades into a placeholder instead of raising.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("column '{column}' not found in the {table} table")]
    MissingColumn { table: String, column: String },
}
