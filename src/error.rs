use std::time::Duration;

use thiserror::Error;

use crate::schema::v1::CleaningStats;

/// Why an upload was rejected. Nothing in the store changes on any of these.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported input file: {0} (expected .xlsx, .xls, .ods, .csv or .tsv)")]
    InputFormat(String),

    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("no data found in input")]
    NoData,

    #[error(
        "no valid rows after validation ({} of {} rows lack LB/AC/FM)",
        .stats.rows_removed,
        .stats.original_rows
    )]
    NoValidRows { stats: CleaningStats },

    #[error("no rows left after cleaning")]
    EmptyAfterCleaning { stats: CleaningStats },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UploadError {
    /// Partial statistics gathered before the run stopped, if any.
    pub fn stats(&self) -> Option<&CleaningStats> {
        match self {
            UploadError::NoValidRows { stats } | UploadError::EmptyAfterCleaning { stats } => {
                Some(stats)
            }
            _ => None,
        }
    }

    /// Recovers a typed error raised inside a pipeline stage.
    pub fn from_pipeline(err: anyhow::Error) -> Self {
        match err.downcast::<UploadError>() {
            Ok(typed) => typed,
            Err(other) => UploadError::Other(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("failed to spawn scorer `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode batch: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write batch to scorer stdin: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("failed to collect scorer output: {0}")]
    Output(#[source] std::io::Error),

    #[error("scorer {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("scorer timed out after {0:?}")]
    Timeout(Duration),

    #[error("scorer output is not a prediction array: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("scorer returned {got} predictions for {expected} rows")]
    RowCount { expected: usize, got: usize },

    #[error("invalid prediction for row {row}: {reason}")]
    InvalidPrediction { row: usize, reason: String },
}
