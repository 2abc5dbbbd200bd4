//! Error types shared by game-backend implementations.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`BackendError`] failures.
pub type BackendResult<T> = Result<T, BackendError>;

/// Failures that can occur while talking to the game backend.
///
/// None of these are retried automatically; they are surfaced to the caller
/// for user-facing display via [`BackendError::user_message`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// Required environment variable is missing.
    #[error("missing backend environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the missing variable.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build backend client")]
    ClientBuilder {
        /// Underlying client construction failure.
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send backend request to `{path}`")]
    RequestSend {
        /// Request path relative to the backend base URL.
        path: String,
        /// Underlying transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The credential was rejected for a mutating call.
    #[error("invalid admin token for `{path}`")]
    Unauthorized {
        /// Request path relative to the backend base URL.
        path: String,
    },
    /// The addressed room, game, or player does not exist.
    #[error("{message}")]
    NotFound {
        /// Backend-provided description, passed through verbatim.
        message: String,
    },
    /// The backend returned an unexpected status code.
    #[error("unexpected backend response status {status} for `{path}`")]
    RequestStatus {
        /// Request path relative to the backend base URL.
        path: String,
        /// Status code of the response.
        status: StatusCode,
    },
    /// Response payload could not be parsed.
    #[error("failed to decode backend response for `{path}`")]
    DecodeResponse {
        /// Request path relative to the backend base URL.
        path: String,
        /// Underlying decode failure.
        #[source]
        source: reqwest::Error,
    },
}

impl BackendError {
    /// User-facing message with light normalization: token failures get a
    /// stable hint, not-found messages pass through, everything else
    /// collapses to a generic retry prompt.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Unauthorized { .. } => {
                "Invalid admin token. Please check your scorer token.".to_string()
            }
            BackendError::NotFound { message } => message.clone(),
            _ => "Operation failed. Please try again.".to_string(),
        }
    }
}
