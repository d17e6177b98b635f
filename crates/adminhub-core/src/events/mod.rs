//! Events emitted by the session core.
//!
//! Events are published on a broadcast channel and consumed by the
//! navigation layer (redirects), the UI (idle warning banner), and logs.

pub mod session;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use session::SessionEvent;

/// Wrapper for session events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionNotice {
    /// Identifier of the login this event belongs to.
    pub session_id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub event: SessionEvent,
}

impl SessionNotice {
    /// Stamps an event with the session identifier and the current time.
    pub fn new(session_id: Uuid, event: SessionEvent) -> Self {
        Self {
            session_id,
            timestamp: Utc::now(),
            event,
        }
    }
}
