use std::path::PathBuf;

use thiserror::Error;

/// Precondition failures. Undefined metrics are not errors and never show up here.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing columns in {table}: {missing:?}")]
    MissingColumns { table: String, missing: Vec<String> },

    #[error("Invalid {table} row {row}: {message}")]
    InvalidRow {
        table: String,
        row: u64,
        message: String,
    },

    #[error("Malformed map configuration: {0}")]
    MapConfig(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyticsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalyticsError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the failure came from the shape of an input document or table
    /// rather than the filesystem. Malformed YAML/JSON configuration counts.
    pub fn is_input_contract(&self) -> bool {
        matches!(
            self,
            AnalyticsError::MissingColumns { .. }
                | AnalyticsError::InvalidRow { .. }
                | AnalyticsError::MapConfig(_)
                | AnalyticsError::InvalidConfig(_)
                | AnalyticsError::Yaml(_)
                | AnalyticsError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
