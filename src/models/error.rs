//! Errors returned by engine operations.

use crate::models::stage::Id;
use crate::storage::{StorageError, Table};
use thiserror::Error;

/// Every engine error is a deterministic function of the stored state and the input;
/// storage is left unchanged when one is returned.
#[derive(Debug, Error)]
pub enum BracketError {
    /// Bad stage configuration or bad match report.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The match result was consumed downstream; reset the dependent chain first.
    #[error("Match {0} is locked")]
    MatchLocked(Id),

    #[error("No {table} with id {id}")]
    NotFound { table: Table, id: Id },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl BracketError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        BracketError::Validation(message.into())
    }
}
