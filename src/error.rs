//! Error types for the availability pipeline.
//!
//! Only conditions that abort a report live here. An empty filter or join
//! result is a [`crate::report::Report::NoData`] value, and a station whose
//! metric cannot be computed is simply left out of the ranking.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required column is absent even after alias resolution.
    #[error("missing column '{column}' in {dataset}")]
    MissingColumn { dataset: String, column: String },

    /// Remote source unreachable or answered with a non-success status.
    #[error("failed to fetch {source_id}: {message}")]
    Fetch {
        source_id: String,
        status: Option<u16>,
        message: String,
    },

    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A query parameter the filter layer refuses to interpret.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl PipelineError {
    pub fn missing_column(dataset: &str, column: &str) -> Self {
        PipelineError::MissingColumn {
            dataset: dataset.to_string(),
            column: column.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
