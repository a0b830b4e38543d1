//! Error types for chariot-db.

use chariot_core::errors::CoreError;
use chariot_core::session::CompletedSession;
use thiserror::Error;

/// Errors from service operations and the record store.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store could not complete a read or write.
    #[error("Store error: {0}")]
    Store(String),

    /// Filesystem failure in the file store or change log.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// The domain error underneath, if any.
    #[must_use]
    pub const fn as_core(&self) -> Option<&CoreError> {
        match self {
            Self::Core(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors from completing an inspection.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The session still has unanswered questions.
    #[error(transparent)]
    Unfinished(#[from] CoreError),

    /// Nothing was stored. The answers are handed back so the caller can
    /// retry with `ChariotService::save_completed`.
    #[error("inspection not saved: {source}")]
    Unsaved {
        completed: Box<CompletedSession>,
        source: DatabaseError,
    },
}
