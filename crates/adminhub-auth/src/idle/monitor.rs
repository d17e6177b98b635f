//! Forced logout after a period of inactivity, preceded by a warning.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{debug, info, trace};

use adminhub_core::error::AppError;
use adminhub_core::events::SessionEvent;
use adminhub_core::result::AppResult;
use adminhub_core::types::Destination;

use crate::events::SessionEvents;
use crate::task::{TaskHandle, cancelled};
use crate::token::TokenStore;

use super::activity::{ActivityHub, ActivityKind};
use super::state::{IdlePhase, IdleSettings, IdleState};

/// State shared with the background loop.
struct IdleInner {
    /// Used to check for a live session and to clear it on expiry.
    store: Arc<TokenStore>,
    /// Timeout and warning lead.
    settings: IdleSettings,
    /// Current phase and last activity.
    state: watch::Sender<IdleState>,
    /// Event publisher.
    events: SessionEvents,
    /// Where to send the user after expiry.
    login: Destination,
}

impl IdleInner {
    /// Instant at which the current phase should be re-evaluated.
    fn next_deadline(&self) -> Option<Instant> {
        let state = *self.state.borrow();
        match state.phase {
            IdlePhase::Active => Some(state.last_activity_at + self.settings.warn_after()),
            IdlePhase::Warning => Some(state.last_activity_at + self.settings.timeout),
            IdlePhase::Expired => None,
        }
    }

    fn record_activity(&self, kind: Option<ActivityKind>) {
        let mut resumed = false;
        self.state.send_if_modified(|state| {
            if state.phase == IdlePhase::Expired {
                return false;
            }
            resumed = state.phase == IdlePhase::Warning;
            state.phase = IdlePhase::Active;
            state.last_activity_at = Instant::now();
            true
        });

        if resumed {
            info!(?kind, "Activity during idle warning; session kept alive");
            self.events.publish(SessionEvent::ActivityResumed);
        } else {
            trace!(?kind, "Activity recorded");
        }
    }

    /// Moves the phase forward if its deadline has passed.
    fn advance(&self) -> IdlePhase {
        let now = Instant::now();
        let mut warned_with = None;

        self.state.send_if_modified(|state| {
            let idle = now.saturating_duration_since(state.last_activity_at);
            match state.phase {
                IdlePhase::Active if idle >= self.settings.warn_after() => {
                    state.phase = IdlePhase::Warning;
                    warned_with = Some(self.settings.timeout.saturating_sub(idle));
                    true
                }
                IdlePhase::Warning if idle >= self.settings.timeout => {
                    state.phase = IdlePhase::Expired;
                    true
                }
                _ => false,
            }
        });

        if let Some(remaining) = warned_with {
            let remaining_ms = remaining.as_millis() as u64;
            info!(remaining_ms, "Idle warning: session will end without activity");
            self.events.publish(SessionEvent::IdleWarning { remaining_ms });
        }

        self.state.borrow().phase
    }

    fn expire(&self) {
        self.store.clear_token();
        info!(redirect = %self.login, "Idle timeout reached; session cleared");
        self.events.publish(SessionEvent::IdleExpired {
            redirect: self.login.clone(),
        });
    }

    async fn run(
        self: Arc<Self>,
        mut listener: broadcast::Receiver<ActivityKind>,
        mut cancel: watch::Receiver<bool>,
    ) {
        debug!(
            timeout_ms = self.settings.timeout.as_millis() as u64,
            warning_lead_ms = self.settings.warning_lead.as_millis() as u64,
            "Idle monitor started"
        );

        let mut listening = true;

        while let Some(deadline) = self.next_deadline() {
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => break,
                received = listener.recv(), if listening => match received {
                    Ok(kind) => self.record_activity(Some(kind)),
                    Err(RecvError::Lagged(skipped)) => {
                        trace!(skipped, "Activity listener lagged");
                        self.record_activity(None);
                    }
                    Err(RecvError::Closed) => {
                        debug!("Activity source closed; relying on timers only");
                        listening = false;
                    }
                },
                _ = time::sleep_until(deadline) => {
                    if !self.store.has_token() {
                        debug!("Session ended elsewhere; idle monitor stopping");
                        break;
                    }
                    if self.advance() == IdlePhase::Expired {
                        self.expire();
                        break;
                    }
                }
            }
        }

        debug!("Idle monitor stopped");
    }
}

/// Watches for inactivity and ends the session after the timeout.
///
/// One instance serves one login: once it has expired it cannot be
/// restarted, and the next login gets a fresh monitor.
pub struct IdleMonitor {
    /// State shared with the background loop.
    inner: Arc<IdleInner>,
    /// Source of activity events.
    hub: ActivityHub,
    /// Running loop, if started.
    task: Mutex<Option<TaskHandle>>,
}

impl std::fmt::Debug for IdleMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdleMonitor")
            .field("settings", &self.inner.settings)
            .field("phase", &self.phase())
            .finish()
    }
}

impl IdleMonitor {
    /// Creates a stopped monitor.
    pub fn new(
        store: Arc<TokenStore>,
        hub: ActivityHub,
        settings: IdleSettings,
        events: SessionEvents,
        login: Destination,
    ) -> Self {
        let (state, _) = watch::channel(IdleState::active_now());
        Self {
            inner: Arc::new(IdleInner {
                store,
                settings,
                state,
                events,
                login,
            }),
            hub,
            task: Mutex::new(None),
        }
    }

    /// Attaches the activity listener and starts the timers.
    ///
    /// Starting a running monitor is a no-op. Fails if the monitor has
    /// already expired or there is no session to watch.
    pub fn start(&self) -> AppResult<()> {
        if self.phase() == IdlePhase::Expired {
            return Err(AppError::session(
                "Idle monitor has expired; a new login needs a new monitor",
            ));
        }
        if !self.inner.store.has_token() {
            return Err(AppError::session("No active session to monitor"));
        }

        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }

        let listener = self.hub.subscribe();
        self.inner.state.send_replace(IdleState::active_now());

        let inner = Arc::clone(&self.inner);
        *task = Some(TaskHandle::spawn("idle-monitor", move |cancel| {
            inner.run(listener, cancel)
        }));
        Ok(())
    }

    /// Cancels the timers and detaches the activity listener.
    pub async fn stop(&self) {
        let handle = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.stop().await;
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> IdleState {
        *self.inner.state.borrow()
    }

    /// Current phase.
    pub fn phase(&self) -> IdlePhase {
        self.state().phase
    }

    /// Watches phase and activity changes.
    pub fn subscribe(&self) -> watch::Receiver<IdleState> {
        self.inner.state.subscribe()
    }

    /// The hub this monitor listens on.
    pub fn hub(&self) -> &ActivityHub {
        &self.hub
    }
}
