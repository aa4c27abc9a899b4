//! Batch error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a batch or wiring its runner
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("batch {batch} is not configured")]
    MissingSection { batch: String },

    #[error("batch {batch} has an invalid section")]
    InvalidSection {
        batch: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("batch {batch} has invalid mode={mode} configured")]
    InvalidMode { batch: String, mode: String },

    #[error("batch {batch} refers to unknown handler {handler}")]
    UnknownHandler { batch: String, handler: String },

    #[error("Failed to read config file {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("No batch config found (searched: {searched:?})")]
    ConfigNotFound { searched: Vec<PathBuf> },
}
