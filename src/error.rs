use thiserror::Error;
use validator::ValidationErrors;

use crate::backend::BackendError;
use crate::dto::SnapshotError;
use crate::engine::ScoreError;

/// Errors surfaced by coordinator-level operations.
///
/// Everything here is recoverable: validation failures leave state untouched,
/// backend failures are surfaced for display, and nothing aborts the process.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The submitted turn broke a scoring rule; state is unchanged.
    #[error("invalid turn: {0}")]
    InvalidTurn(#[from] ScoreError),
    /// Game settings failed validation.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    /// Undo was requested with an empty history.
    #[error("no turns to undo")]
    NothingToUndo,
    /// A mutating call was attempted without a credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The addressed room, game, or player does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The backend rejected or failed a call.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// An authoritative snapshot could not be reconciled.
    #[error("snapshot rejected: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidSettings(format!("validation failed: {err}"))
    }
}

impl ServiceError {
    /// Message suitable for direct user display.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Backend(backend) => backend.user_message(),
            ServiceError::Unauthorized(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
