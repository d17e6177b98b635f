//! Session lifecycle events.

use serde::{Deserialize, Serialize};

use crate::types::Destination;

/// Events describing the lifecycle of a single login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A login was accepted and background tasks were started.
    Started {
        /// Subject identifier from the token.
        subject: String,
    },
    /// The bearer token was replaced by a refreshed one.
    TokenRefreshed {
        /// Expiry of the new token in epoch milliseconds, when decodable.
        expires_at_ms: Option<i64>,
    },
    /// A refresh request failed. The current token is left in place.
    RefreshFailed {
        /// Error message reported by the refresh call.
        message: String,
    },
    /// A refresh result arrived after the session changed and was dropped.
    RefreshDiscarded,
    /// The idle warning period started.
    IdleWarning {
        /// Milliseconds left before the hard cutoff.
        remaining_ms: u64,
    },
    /// User activity arrived during the warning period.
    ActivityResumed,
    /// The idle timeout elapsed; the session was cleared.
    IdleExpired {
        /// Where the navigation layer should send the user.
        redirect: Destination,
    },
    /// The user logged out explicitly.
    LoggedOut {
        /// Where the navigation layer should send the user.
        redirect: Destination,
    },
}

impl SessionEvent {
    /// Returns the redirect target for events that end the session.
    pub fn redirect(&self) -> Option<&Destination> {
        match self {
            Self::IdleExpired { redirect } | Self::LoggedOut { redirect } => Some(redirect),
            _ => None,
        }
    }
}
