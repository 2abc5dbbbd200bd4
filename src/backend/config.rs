//! Runtime configuration for reaching the game backend.

use super::error::{BackendError, BackendResult};

/// Where the game backend lives.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// HTTP base URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Optional bearer token for an owner session. Room-scoped admin tokens
    /// are passed per call instead.
    pub session_token: Option<String>,
}

impl BackendConfig {
    /// Construct a configuration from an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url: String = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            session_token: None,
        }
    }

    /// Attach an owner session token to the configuration.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> BackendResult<Self> {
        let base_url =
            std::env::var("DARTLINK_BACKEND_URL").map_err(|_| BackendError::MissingEnvVar {
                var: "DARTLINK_BACKEND_URL",
            })?;

        let mut config = Self::new(base_url);
        if let Ok(token) = std::env::var("DARTLINK_SESSION_TOKEN") {
            config = config.with_session_token(token);
        }

        Ok(config)
    }
}
