use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrainError>;

/// Errors of the training pipeline
#[derive(Error, Debug)]
pub enum TrainError {
    /// Invalid parameters, degenerate data or a malformed tree
    #[error(transparent)]
    Model(#[from] sepsis_forest::error::Error),
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed forest document: {0}")]
    Json(#[from] serde_json::Error),
}
