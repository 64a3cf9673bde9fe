//! Sync configuration parsed from environment variables.
//!
//! Optional, all with defaults:
//! - `TABSYNC_STALE_THRESHOLD_MS`: default 3000
//! - `TABSYNC_HEARTBEAT_INTERVAL_MS`: defaults to the stale threshold
//! - `TABSYNC_CHANNEL_PREFIX`: default [`DEFAULT_CHANNEL_PREFIX`]
//! - `TABSYNC_GEOMETRY_POLL_MS`: default 16
//!
//! Unparsable values fall back to the default with a warning; the resulting
//! config is then validated as a whole.

use std::time::Duration;

use tracing::warn;

use crate::error::ErrorCode;

pub const DEFAULT_STALE_THRESHOLD_MS: u64 = 3000;
pub const DEFAULT_CHANNEL_PREFIX: &str = "ije-multi-tabs-experiment-db";
pub const DEFAULT_GEOMETRY_POLL_MS: u64 = 16;

pub const ENV_STALE_THRESHOLD_MS: &str = "TABSYNC_STALE_THRESHOLD_MS";
pub const ENV_HEARTBEAT_INTERVAL_MS: &str = "TABSYNC_HEARTBEAT_INTERVAL_MS";
pub const ENV_CHANNEL_PREFIX: &str = "TABSYNC_CHANNEL_PREFIX";
pub const ENV_GEOMETRY_POLL_MS: &str = "TABSYNC_GEOMETRY_POLL_MS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("stale threshold must be greater than zero")]
    ZeroStaleThreshold,
    #[error("heartbeat interval must be greater than zero")]
    ZeroHeartbeatInterval,
    #[error("geometry poll interval must be greater than zero")]
    ZeroPollInterval,
    /// Peers would expire a healthy node between two of its heartbeats.
    #[error("heartbeat interval {heartbeat_ms}ms exceeds stale threshold {stale_threshold_ms}ms")]
    HeartbeatExceedsThreshold { heartbeat_ms: u64, stale_threshold_ms: u64 },
    #[error("invalid channel prefix {0:?}: must be non-empty and contain no ':'")]
    InvalidPrefix(String),
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroStaleThreshold | Self::ZeroHeartbeatInterval | Self::ZeroPollInterval => "E_CONFIG_ZERO_INTERVAL",
            Self::HeartbeatExceedsThreshold { .. } => "E_CONFIG_HEARTBEAT",
            Self::InvalidPrefix(_) => "E_CONFIG_PREFIX",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Maximum age of a peer's last publication before it stops counting.
    pub stale_threshold_ms: u64,
    /// Cadence of unconditional republication of own state.
    pub heartbeat_interval_ms: u64,
    /// Namespace shared by every node's channel key.
    pub channel_prefix: String,
    /// Cadence of the external window-geometry poller.
    pub geometry_poll_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            stale_threshold_ms: DEFAULT_STALE_THRESHOLD_MS,
            heartbeat_interval_ms: DEFAULT_STALE_THRESHOLD_MS,
            channel_prefix: DEFAULT_CHANNEL_PREFIX.to_owned(),
            geometry_poll_ms: DEFAULT_GEOMETRY_POLL_MS,
        }
    }
}

impl SyncConfig {
    /// Build a validated config from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the combined values fail [`SyncConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Build a validated config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the combined values fail [`SyncConfig::validate`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let stale_threshold_ms = parse_or(&lookup, ENV_STALE_THRESHOLD_MS, DEFAULT_STALE_THRESHOLD_MS);
        let config = Self {
            stale_threshold_ms,
            heartbeat_interval_ms: parse_or(&lookup, ENV_HEARTBEAT_INTERVAL_MS, stale_threshold_ms),
            channel_prefix: lookup(ENV_CHANNEL_PREFIX).unwrap_or_else(|| DEFAULT_CHANNEL_PREFIX.to_owned()),
            geometry_poll_ms: parse_or(&lookup, ENV_GEOMETRY_POLL_MS, DEFAULT_GEOMETRY_POLL_MS),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stale_threshold_ms == 0 {
            return Err(ConfigError::ZeroStaleThreshold);
        }
        if self.heartbeat_interval_ms == 0 {
            return Err(ConfigError::ZeroHeartbeatInterval);
        }
        if self.geometry_poll_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.heartbeat_interval_ms > self.stale_threshold_ms {
            return Err(ConfigError::HeartbeatExceedsThreshold {
                heartbeat_ms: self.heartbeat_interval_ms,
                stale_threshold_ms: self.stale_threshold_ms,
            });
        }
        if self.channel_prefix.is_empty() || self.channel_prefix.contains(wire::KEY_SEPARATOR) {
            return Err(ConfigError::InvalidPrefix(self.channel_prefix.clone()));
        }
        Ok(())
    }

    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    #[must_use]
    pub fn geometry_poll_interval(&self) -> Duration {
        Duration::from_millis(self.geometry_poll_ms)
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    raw.trim().parse::<u64>().unwrap_or_else(|e| {
        warn!(key, value = %raw, error = %e, default, "unparsable config value, using default");
        default
    })
}

fn env_lookup(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) => Some(value),
        Err(std::env::VarError::NotPresent) => None,
        Err(std::env::VarError::NotUnicode(_)) => {
            warn!(key, "ignoring non-unicode environment value");
            None
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
