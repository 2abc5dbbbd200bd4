//! Application-level configuration loading for the follower binary.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::sync::SyncTuning;

/// Default location on disk where the binary looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "DARTLINK_CONFIG_PATH";
/// Backend base URL used when the configuration does not name one.
const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
/// Realtime base URL used when the configuration does not name one.
const DEFAULT_REALTIME_URL: &str = "ws://localhost:8080";
/// Poll cadence while the realtime channel is in fallback mode.
const DEFAULT_FALLBACK_POLL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// HTTP base URL of the game backend.
    pub backend_url: String,
    /// WebSocket base URL of the realtime channel.
    pub realtime_url: String,
    /// Reconnect behavior of the snapshot transport.
    pub tuning: SyncTuning,
    /// How often to poll the backend while the transport is degraded.
    pub fallback_poll: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to
    /// built-in defaults when the file is absent or unreadable.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            realtime_url: DEFAULT_REALTIME_URL.into(),
            tuning: SyncTuning::default(),
            fallback_poll: DEFAULT_FALLBACK_POLL,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file.
struct RawConfig {
    backend_url: Option<String>,
    realtime_url: Option<String>,
    base_reconnect_delay_ms: Option<u64>,
    max_reconnect_attempts: Option<u32>,
    fallback_poll_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppConfig::default();
        let mut tuning = SyncTuning::default();
        if let Some(delay_ms) = raw.base_reconnect_delay_ms {
            tuning.base_delay = Duration::from_millis(delay_ms);
        }
        if let Some(attempts) = raw.max_reconnect_attempts {
            tuning.max_reconnect_attempts = attempts;
        }

        Self {
            backend_url: raw.backend_url.unwrap_or(defaults.backend_url),
            realtime_url: raw.realtime_url.unwrap_or(defaults.realtime_url),
            tuning,
            fallback_poll: raw
                .fallback_poll_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.fallback_poll),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_fall_back_per_field() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"backend_url": "https://darts.example"}"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.backend_url, "https://darts.example");
        assert_eq!(config.realtime_url, DEFAULT_REALTIME_URL);
        assert_eq!(config.fallback_poll, DEFAULT_FALLBACK_POLL);
    }

    #[test]
    fn tuning_fields_override_the_defaults() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"base_reconnect_delay_ms": 250, "max_reconnect_attempts": 8, "fallback_poll_secs": 30}"#,
        )
        .unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.tuning.base_delay, Duration::from_millis(250));
        assert_eq!(config.tuning.max_reconnect_attempts, 8);
        assert_eq!(config.fallback_poll, Duration::from_secs(30));
    }
}
