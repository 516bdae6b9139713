use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out waiting for lock {0}")]
    LockTimeout(PathBuf),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate claim id: {0}")]
    DuplicateClaim(String),

    #[error("Duplicate payment id: {0}")]
    DuplicatePayment(String),
}
