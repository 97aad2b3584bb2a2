use std::path::PathBuf;
use thiserror::Error;

/// The main error type for locmatch operations.
#[derive(Debug, Error)]
pub enum LocmatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse report JSON from {path}: {source}")]
    ReportJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write report JSON to {path}: {source}")]
    ReportJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Failed to retrieve storage item: {0}")]
    StorageMiss(String),

    #[error("All {pair_count} pair(s) failed to aggregate: {}", .messages.join("; "))]
    AggregationFailed {
        pair_count: usize,
        messages: Vec<String>,
    },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Unsupported {what}: {value}")]
    Unsupported { what: String, value: String },
}

impl LocmatchError {
    /// Convenience constructor for [`LocmatchError::Unsupported`].
    pub fn unsupported(what: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Unsupported {
            what: what.into(),
            value: value.into(),
        }
    }
}
