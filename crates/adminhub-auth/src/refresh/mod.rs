//! Proactive token renewal.

pub mod scheduler;

pub use scheduler::{RefreshSettings, SessionRefreshScheduler, TickOutcome};
