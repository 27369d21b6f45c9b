//! Errors raised while persisting checkpoints and the event log.

use thiserror::Error;

/// Failure of a snapshot or event-log repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("in-memory snapshot lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bincode encoding failed: {0}")]
    Serialization(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("event log already exists: {0}")]
    LogAlreadyExists(String),

    #[error("truncated event at offset {offset}: expected {expected} bytes, found {actual}")]
    PartialWrite {
        offset: u64,
        expected: usize,
        actual: usize,
    },
}

impl From<bincode::Error> for RepositoryError {
    fn from(error: bincode::Error) -> Self {
        RepositoryError::Serialization(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
