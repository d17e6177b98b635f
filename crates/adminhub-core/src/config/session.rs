//! Session timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Timing constants for token refresh and idle enforcement.
///
/// Defaults are the reference values: refresh check every minute, renew
/// two minutes before expiry, log out after ten idle minutes with a
/// thirty second warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cadence of the refresh check in milliseconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,
    /// Remaining token lifetime at or below which a refresh is issued.
    #[serde(default = "default_refresh_threshold")]
    pub refresh_threshold_ms: u64,
    /// Maximum inactivity before the session is terminated.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_ms: u64,
    /// How long before the hard cutoff the idle warning fires.
    #[serde(default = "default_idle_warning_lead")]
    pub idle_warning_lead_ms: u64,
}

impl SessionConfig {
    /// Validates timer relationships.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.refresh_interval_ms == 0 {
            return Err(AppError::configuration(
                "session.refresh_interval_ms must be greater than zero",
            ));
        }
        if self.idle_timeout_ms == 0 {
            return Err(AppError::configuration(
                "session.idle_timeout_ms must be greater than zero",
            ));
        }
        if self.idle_warning_lead_ms >= self.idle_timeout_ms {
            return Err(AppError::configuration(format!(
                "session.idle_warning_lead_ms ({}) must be less than session.idle_timeout_ms ({})",
                self.idle_warning_lead_ms, self.idle_timeout_ms
            )));
        }
        Ok(())
    }

    /// Refresh check cadence.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Idle hard cutoff.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Idle warning lead time.
    pub fn idle_warning_lead(&self) -> Duration {
        Duration::from_millis(self.idle_warning_lead_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval(),
            refresh_threshold_ms: default_refresh_threshold(),
            idle_timeout_ms: default_idle_timeout(),
            idle_warning_lead_ms: default_idle_warning_lead(),
        }
    }
}

fn default_refresh_interval() -> u64 {
    60_000
}

fn default_refresh_threshold() -> u64 {
    120_000
}

fn default_idle_timeout() -> u64 {
    600_000
}

fn default_idle_warning_lead() -> u64 {
    30_000
}
