//! Periodic check that renews the bearer token shortly before it expires.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use adminhub_core::config::SessionConfig;
use adminhub_core::error::AppError;
use adminhub_core::events::SessionEvent;
use adminhub_core::result::AppResult;
use adminhub_core::traits::{Clock, TokenRefresher};

use crate::events::SessionEvents;
use crate::task::{TaskHandle, cancelled};
use crate::token::TokenStore;

/// Refresh cadence and threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    /// How often the token is checked.
    pub interval: Duration,
    /// Remaining lifetime at or below which a refresh is issued.
    pub threshold_ms: i64,
}

impl From<&SessionConfig> for RefreshSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            interval: config.refresh_interval(),
            threshold_ms: i64::try_from(config.refresh_threshold_ms).unwrap_or(i64::MAX),
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

/// What a single check did.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// No decodable token; nothing to refresh.
    NoSession,
    /// The token has more than the threshold left.
    Fresh {
        /// Milliseconds until expiry.
        remaining_ms: i64,
    },
    /// Another refresh is still in flight.
    InFlight,
    /// A new token was stored.
    Refreshed,
    /// A new token arrived after the session changed and was dropped.
    Discarded,
    /// The refresh call failed; the current token was left in place.
    Failed(AppError),
}

/// Shared state used by both the background loop and direct callers.
struct RefreshInner {
    /// Token owner.
    store: Arc<TokenStore>,
    /// Backend refresh capability.
    refresher: Arc<dyn TokenRefresher>,
    /// Wall clock for expiry arithmetic.
    clock: Arc<dyn Clock>,
    /// Cadence and threshold.
    settings: RefreshSettings,
    /// Set while a refresh request is outstanding.
    in_flight: AtomicBool,
    /// Event publisher.
    events: SessionEvents,
}

/// Clears the in-flight flag when the refresh future completes or is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RefreshInner {
    async fn tick(&self) -> TickOutcome {
        self.check(self.settings.threshold_ms).await
    }

    async fn check(&self, threshold_ms: i64) -> TickOutcome {
        let Some((generation, claims)) = self.store.decode_with_generation() else {
            return TickOutcome::NoSession;
        };

        let remaining_ms = claims.remaining_ms(self.clock.now_ms());
        if remaining_ms > threshold_ms {
            debug!(remaining_ms, "Token still fresh");
            return TickOutcome::Fresh { remaining_ms };
        }

        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("Refresh already in flight");
            return TickOutcome::InFlight;
        }
        let _guard = InFlightGuard(&self.in_flight);

        debug!(
            subject = %claims.sub,
            remaining_ms,
            generation,
            "Requesting token refresh"
        );

        match self.refresher.refresh(claims.subject_id()).await {
            Ok(refreshed) => {
                if self
                    .store
                    .replace_if_generation(generation, &refreshed.access_token)
                {
                    let expires_at_ms = self.store.decode().map(|c| c.expires_at_ms());
                    info!(subject = %claims.sub, ?expires_at_ms, "Session token refreshed");
                    self.events
                        .publish(SessionEvent::TokenRefreshed { expires_at_ms });
                    TickOutcome::Refreshed
                } else {
                    info!(subject = %claims.sub, "Session changed during refresh; result dropped");
                    self.events.publish(SessionEvent::RefreshDiscarded);
                    TickOutcome::Discarded
                }
            }
            Err(e) => {
                warn!(
                    subject = %claims.sub,
                    remaining_ms,
                    error = %e,
                    "Token refresh failed; keeping current token"
                );
                self.events.publish(SessionEvent::RefreshFailed {
                    message: e.message.clone(),
                });
                TickOutcome::Failed(e)
            }
        }
    }

    async fn run(self: Arc<Self>, mut cancel: watch::Receiver<bool>) {
        info!(
            interval_ms = self.settings.interval.as_millis() as u64,
            threshold_ms = self.settings.threshold_ms,
            "Token refresh scheduler started"
        );

        let mut interval = time::interval(self.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => break,
                _ = interval.tick() => {}
            }

            let outcome = tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => break,
                outcome = self.tick() => outcome,
            };

            if let TickOutcome::NoSession = outcome {
                debug!("No session to refresh; scheduler stopping");
                break;
            }
        }

        info!("Token refresh scheduler stopped");
    }
}

/// Keeps a live session alive by renewing its token before expiry.
///
/// Failures are reported through events and logs only; this component
/// never clears the token or forces a logout.
pub struct SessionRefreshScheduler {
    /// State shared with the background loop.
    inner: Arc<RefreshInner>,
    /// Running loop, if started.
    task: Mutex<Option<TaskHandle>>,
}

impl std::fmt::Debug for SessionRefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRefreshScheduler")
            .field("settings", &self.inner.settings)
            .field("running", &self.is_running())
            .finish()
    }
}

impl SessionRefreshScheduler {
    /// Creates a stopped scheduler.
    pub fn new(
        store: Arc<TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
        clock: Arc<dyn Clock>,
        settings: RefreshSettings,
        events: SessionEvents,
    ) -> Self {
        Self {
            inner: Arc::new(RefreshInner {
                store,
                refresher,
                clock,
                settings,
                in_flight: AtomicBool::new(false),
                events,
            }),
            task: Mutex::new(None),
        }
    }

    /// Starts the periodic check. The first check runs immediately.
    ///
    /// Starting an already running scheduler replaces its loop, so at most
    /// one timer is ever active. Fails on a zero interval.
    pub fn start(&self) -> AppResult<()> {
        if self.inner.settings.interval.is_zero() {
            return Err(AppError::configuration(
                "Token refresh interval must be greater than zero",
            ));
        }

        let inner = Arc::clone(&self.inner);
        let handle = TaskHandle::spawn("token-refresh", move |cancel| inner.run(cancel));
        let previous = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        drop(previous);
        Ok(())
    }

    /// Stores `token` and starts the periodic check.
    pub fn start_with_token(&self, token: impl AsRef<str>) -> AppResult<()> {
        self.inner.store.set_token(token);
        self.start()
    }

    /// Cancels the pending timer and waits for the loop to exit.
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

    /// Whether the background loop is alive.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Runs one check now, independent of the timer.
    pub async fn tick(&self) -> TickOutcome {
        self.inner.tick().await
    }

    /// Refreshes immediately regardless of the remaining lifetime.
    pub async fn refresh_now(&self) -> TickOutcome {
        self.inner.check(i64::MAX).await
    }
}
