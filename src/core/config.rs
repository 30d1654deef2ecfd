//! Configuration: fixed defaults + env var overrides. There is no config file;
//! the monitor is invoked without arguments by provisioning pipelines.

#![allow(missing_docs)]

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{MonitorError, Result};

/// Kernel interface exposing DRBD replication status.
pub const DEFAULT_STATUS_PATH: &str = "/proc/drbd";
/// Maximum number of retained state-change history entries.
pub const HISTORY_CAPACITY: usize = 12;
/// Maximum number of raw status lines shown in the live dashboard.
pub const RAW_PANE_MAX_LINES: usize = 8;

const MIN_REFRESH_INTERVAL_MS: u64 = 50;
const MAX_REFRESH_INTERVAL_MS: u64 = 60_000;
const MAX_COMPLETION_HOLD_MS: u64 = 10_000;

/// Effective monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Status interface polled every tick.
    pub status_path: PathBuf,
    /// Delay between polls.
    pub refresh_interval_ms: u64,
    /// How long the final frame stays on screen once sync completes.
    pub completion_hold_ms: u64,
    /// Optional JSONL transition log. `None` keeps the monitor write-free.
    pub event_log: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            status_path: PathBuf::from(DEFAULT_STATUS_PATH),
            refresh_interval_ms: 1_000,
            completion_hold_ms: 300,
            event_log: None,
        }
    }
}

impl MonitorConfig {
    /// Load defaults, apply `DSM_*` environment overrides, validate.
    pub fn load() -> Result<Self> {
        Self::load_from(env_var)
    }

    /// Same as [`MonitorConfig::load`] with an injectable variable lookup.
    pub fn load_from<F>(mut lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup("DSM_STATUS_PATH") {
            cfg.status_path = PathBuf::from(raw.trim());
        }
        if let Some(raw) = lookup("DSM_REFRESH_INTERVAL_MS") {
            cfg.refresh_interval_ms = parse_env_u64("DSM_REFRESH_INTERVAL_MS", &raw)?;
        }
        if let Some(raw) = lookup("DSM_COMPLETION_HOLD_MS") {
            cfg.completion_hold_ms = parse_env_u64("DSM_COMPLETION_HOLD_MS", &raw)?;
        }
        if let Some(raw) = lookup("DSM_EVENT_LOG") {
            cfg.event_log = Some(PathBuf::from(raw.trim()));
        }

        cfg.validate()?;
        Ok(cfg)
    }

    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    #[must_use]
    pub const fn completion_hold(&self) -> Duration {
        Duration::from_millis(self.completion_hold_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.status_path.as_os_str().is_empty() {
            return Err(MonitorError::InvalidConfig {
                details: "status_path must not be empty".to_string(),
            });
        }

        let interval = self.refresh_interval_ms;
        if !(MIN_REFRESH_INTERVAL_MS..=MAX_REFRESH_INTERVAL_MS).contains(&interval) {
            return Err(MonitorError::InvalidConfig {
                details: format!(
                    "refresh_interval_ms must be in [{MIN_REFRESH_INTERVAL_MS}, \
                     {MAX_REFRESH_INTERVAL_MS}], got {interval}"
                ),
            });
        }

        if self.completion_hold_ms > MAX_COMPLETION_HOLD_MS {
            return Err(MonitorError::InvalidConfig {
                details: format!(
                    "completion_hold_ms must be <= {MAX_COMPLETION_HOLD_MS}, got {}",
                    self.completion_hold_ms
                ),
            });
        }

        if self
            .event_log
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(MonitorError::InvalidConfig {
                details: "event_log must not be empty when set".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|error| MonitorError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
