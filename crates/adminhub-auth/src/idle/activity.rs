//! User interaction events feeding the idle monitor.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default number of buffered activity events per listener.
const DEFAULT_CAPACITY: usize = 32;

/// Kinds of user interaction that count as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Mouse or pointer click.
    Click,
    /// Key press.
    KeyPress,
    /// Pointer movement.
    PointerMove,
    /// Scrolling.
    Scroll,
    /// Touch start.
    Touch,
}

impl ActivityKind {
    /// Parses a DOM-style event name.
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "click" | "mousedown" => Some(Self::Click),
            "keypress" | "keydown" => Some(Self::KeyPress),
            "mousemove" | "pointermove" => Some(Self::PointerMove),
            "scroll" | "wheel" => Some(Self::Scroll),
            "touchstart" => Some(Self::Touch),
            _ => None,
        }
    }
}

/// Process-wide fan-out point for activity events.
///
/// Holding a receiver from [`ActivityHub::subscribe`] is the equivalent
/// of having listeners attached; dropping it detaches them.
#[derive(Debug, Clone)]
pub struct ActivityHub {
    sender: broadcast::Sender<ActivityKind>,
}

impl ActivityHub {
    /// Creates a hub with the default buffer size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a hub buffering up to `capacity` events per listener.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Records an interaction. Returns how many listeners received it.
    pub fn record(&self, kind: ActivityKind) -> usize {
        self.sender.send(kind).unwrap_or(0)
    }

    /// Attaches a listener.
    pub fn subscribe(&self) -> broadcast::Receiver<ActivityKind> {
        self.sender.subscribe()
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ActivityHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_listeners_is_noop() {
        let hub = ActivityHub::new();
        assert_eq!(hub.record(ActivityKind::Click), 0);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_listener_lifecycle() {
        let hub = ActivityHub::new();
        let listener = hub.subscribe();
        assert_eq!(hub.listener_count(), 1);
        assert_eq!(hub.record(ActivityKind::KeyPress), 1);
        drop(listener);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(ActivityKind::from_event_name("mousemove"), Some(ActivityKind::PointerMove));
        assert_eq!(ActivityKind::from_event_name("KeyDown"), Some(ActivityKind::KeyPress));
        assert_eq!(ActivityKind::from_event_name("resize"), None);
    }
}
