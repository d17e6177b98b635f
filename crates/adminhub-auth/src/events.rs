//! Session event publishing.

use tokio::sync::broadcast;
use uuid::Uuid;

use adminhub_core::events::{SessionEvent, SessionNotice};

/// Default capacity of a session event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Publishes events for one login onto a shared broadcast channel.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    /// Identifier of the login the events belong to.
    session_id: Uuid,
    /// Shared channel.
    sender: broadcast::Sender<SessionNotice>,
}

impl SessionEvents {
    /// Publishes onto an existing channel.
    pub fn new(session_id: Uuid, sender: broadcast::Sender<SessionNotice>) -> Self {
        Self { session_id, sender }
    }

    /// Publishes onto a fresh channel of its own.
    pub fn standalone() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self::new(Uuid::new_v4(), sender)
    }

    /// The login identifier stamped onto every event.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Subscribes to the underlying channel.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotice> {
        self.sender.subscribe()
    }

    /// Publishes an event. Having no subscribers is not an error.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self
            .sender
            .send(SessionNotice::new(self.session_id, event));
    }
}
