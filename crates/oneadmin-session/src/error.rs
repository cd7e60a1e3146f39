use oneadmin_core::ConsoleError;
use thiserror::Error;

/// Errors raised while persisting the local key/value cache.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for ConsoleError {
    fn from(e: StoreError) -> Self {
        ConsoleError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
