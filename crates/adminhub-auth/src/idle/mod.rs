//! Inactivity enforcement.

pub mod activity;
pub mod monitor;
pub mod state;

pub use activity::{ActivityHub, ActivityKind};
pub use monitor::IdleMonitor;
pub use state::{IdlePhase, IdleSettings, IdleState};
