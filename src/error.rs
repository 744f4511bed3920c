use thiserror::Error;

use crate::action::DecodeError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ActionLogError {
    #[error("node not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("store unavailable at {path}: {reason}")]
    StoreUnavailable { path: String, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{failed} of {total} paths failed, check the log for details")]
    BatchFailed { failed: usize, total: usize },

    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ActionLogError {
    /// Attach the path an operation was working on to a store error
    pub fn from_store(path: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(missing) => ActionLogError::NotFound(missing),
            StoreError::Unavailable(reason) => ActionLogError::StoreUnavailable {
                path: path.to_string(),
                reason,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ActionLogError>;
