//! Desk configuration.
//!
//! # Responsibility
//! - Hold the timing bounds used by panel fetches, waits and toasts.
//! - Load overrides from JSON with defaults for omitted fields.
//!
//! # Invariants
//! - Every duration is strictly positive.
//! - Unknown keys are rejected instead of silently ignored.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

const DEFAULT_FETCH_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_TOAST_REVEAL_DELAY_MS: u64 = 150;
const DEFAULT_TOAST_DURATION_MS: u64 = 4_000;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    ZeroDuration(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::ZeroDuration(field) => write!(f, "config field `{field}` must be > 0"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::ZeroDuration(_) => None,
        }
    }
}

/// Timing and logging settings for a `ProjectDesk`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeskConfig {
    /// Upper bound for a detail fetch before the panel fails.
    pub fetch_timeout_ms: u64,
    /// Default bound for `wait_until` callers.
    pub wait_timeout_ms: u64,
    /// Delay between queueing a toast and its text becoming visible.
    pub toast_reveal_delay_ms: u64,
    /// How long a revealed toast stays visible.
    pub toast_duration_ms: u64,
    pub log_level: String,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            toast_reveal_delay_ms: DEFAULT_TOAST_REVEAL_DELAY_MS,
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
            log_level: crate::logging::default_log_level().to_string(),
        }
    }
}

impl DeskConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("fetch_timeout_ms", self.fetch_timeout_ms),
            ("wait_timeout_ms", self.wait_timeout_ms),
            ("toast_duration_ms", self.toast_duration_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroDuration(field));
            }
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn toast_reveal_delay(&self) -> Duration {
        Duration::from_millis(self.toast_reveal_delay_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}
