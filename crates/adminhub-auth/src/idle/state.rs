//! Idle state machine definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use adminhub_core::config::SessionConfig;

/// Phase of the idle state machine.
///
/// `Active -> Warning -> Expired`, with activity moving `Warning` back to
/// `Active`. `Expired` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdlePhase {
    /// Recent activity.
    Active,
    /// Inside the warning window before the hard cutoff.
    Warning,
    /// Timed out; the session has been cleared.
    Expired,
}

/// Snapshot of the idle timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleState {
    /// Current phase.
    pub phase: IdlePhase,
    /// When the last monitored activity happened.
    pub last_activity_at: Instant,
}

impl IdleState {
    /// Fresh state with activity recorded now.
    pub fn active_now() -> Self {
        Self {
            phase: IdlePhase::Active,
            last_activity_at: Instant::now(),
        }
    }

    /// Whether the warning for the current idle stretch has fired.
    pub fn warning_fired(&self) -> bool {
        matches!(self.phase, IdlePhase::Warning | IdlePhase::Expired)
    }
}

/// Idle timeout and warning lead time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleSettings {
    /// Inactivity that ends the session.
    pub timeout: Duration,
    /// How long before `timeout` the warning fires.
    pub warning_lead: Duration,
}

impl IdleSettings {
    /// Inactivity after which the warning fires.
    pub fn warn_after(&self) -> Duration {
        self.timeout.saturating_sub(self.warning_lead)
    }
}

impl From<&SessionConfig> for IdleSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            timeout: config.idle_timeout(),
            warning_lead: config.idle_warning_lead(),
        }
    }
}

impl Default for IdleSettings {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}
