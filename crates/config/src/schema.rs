use serde::{Deserialize, Serialize};
use ssm_core::{window::DEFAULT_CAPACITY, Result, SsmError};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure parsed from `ssm.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsmConfig {
    /// Backend connection settings.
    pub api: ApiConfig,
    /// Poll cadences and window sizes for the live dashboard.
    pub poller: PollerConfig,
    /// Where the login session is persisted.
    pub session: SessionConfig,
}

impl SsmConfig {
    /// Reject values that would make the client spin or never refresh.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(SsmError::Config("api.base_url must not be empty".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(SsmError::Config("api.timeout_secs must be > 0".into()));
        }
        let p = &self.poller;
        for (name, value) in [
            ("poller.fast_interval_ms", p.fast_interval_ms),
            ("poller.slow_interval_ms", p.slow_interval_ms),
            ("poller.notification_interval_ms", p.notification_interval_ms),
        ] {
            if value == 0 {
                return Err(SsmError::Config(format!("{name} must be > 0")));
            }
        }
        if p.window_capacity == 0 {
            return Err(SsmError::Config("poller.window_capacity must be > 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url:     "http://127.0.0.1:8000/api".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Live `/system/info` cadence.
    pub fast_interval_ms: u64,
    /// `/system/history` cadence.
    pub slow_interval_ms: u64,
    /// Samples kept per live series.
    pub window_capacity: usize,
    /// Unread-notification badge cadence.
    pub notification_interval_ms: u64,
}

impl PollerConfig {
    pub fn fast_interval(&self) -> Duration {
        Duration::from_millis(self.fast_interval_ms)
    }

    pub fn slow_interval(&self) -> Duration {
        Duration::from_millis(self.slow_interval_ms)
    }

    pub fn notification_interval(&self) -> Duration {
        Duration::from_millis(self.notification_interval_ms)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            fast_interval_ms:         2_000,
            slow_interval_ms:         120_000,
            window_capacity:          DEFAULT_CAPACITY,
            notification_interval_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Override for the session snapshot file.
    pub path: Option<PathBuf>,
}
