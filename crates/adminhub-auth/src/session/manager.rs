//! Session manager: login, logout, activity, and navigation gating.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tracing::{info, warn};
use uuid::Uuid;

use adminhub_core::config::{GateConfig, SessionConfig};
use adminhub_core::error::AppError;
use adminhub_core::events::{SessionEvent, SessionNotice};
use adminhub_core::result::AppResult;
use adminhub_core::traits::{Clock, TokenRefresher, UserDirectory};
use adminhub_core::types::{Destination, UserProfile};

use crate::events::{EVENT_CHANNEL_CAPACITY, SessionEvents};
use crate::gate::{Access, GateDecision, RoleGate};
use crate::idle::{ActivityHub, ActivityKind, IdleMonitor, IdleSettings, IdleState};
use crate::refresh::{RefreshSettings, SessionRefreshScheduler, TickOutcome};
use crate::token::{Claims, TokenStore};

/// Background components owned by one login.
struct ActiveSession {
    /// Login identifier stamped on events.
    id: Uuid,
    /// Publisher for this login.
    events: SessionEvents,
    /// Token renewal loop.
    scheduler: Arc<SessionRefreshScheduler>,
    /// Inactivity enforcement.
    idle: IdleMonitor,
    /// Profile cached after the first lookup.
    profile: Option<UserProfile>,
}

/// Wires the token store, refresh scheduler, idle monitor, and role gate
/// together for the lifetime of each login.
pub struct SessionManager {
    /// Token owner shared by every component.
    store: Arc<TokenStore>,
    /// Backend refresh call.
    refresher: Arc<dyn TokenRefresher>,
    /// Backend user lookup.
    directory: Arc<dyn UserDirectory>,
    /// Wall clock for expiry checks.
    clock: Arc<dyn Clock>,
    /// Navigation policy.
    gate: RoleGate,
    /// Activity fan-out.
    hub: ActivityHub,
    /// Timing configuration.
    config: SessionConfig,
    /// Event channel shared by all logins.
    events: broadcast::Sender<SessionNotice>,
    /// The current login, if any.
    active: Mutex<Option<ActiveSession>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish()
    }
}

impl SessionManager {
    /// Creates a manager with no active login.
    ///
    /// Fails if the session timings are unusable.
    pub fn new(
        store: Arc<TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
        directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
        gate: &GateConfig,
    ) -> AppResult<Self> {
        config.validate()?;

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            store,
            refresher,
            directory,
            clock,
            gate: RoleGate::from_config(gate),
            hub: ActivityHub::new(),
            config,
            events,
            active: Mutex::new(None),
        })
    }

    /// Starts a session for a freshly issued token.
    ///
    /// Any previous login is torn down first. Fails without side effects
    /// beyond that teardown if the token cannot be decoded.
    pub async fn begin(&self, token: impl AsRef<str>) -> AppResult<Uuid> {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            info!(session_id = %previous.id, "Replacing previous session");
            Self::teardown(&previous).await;
        }

        self.store.set_token(token);
        let Some(claims) = self.store.decode() else {
            self.store.clear_token();
            return Err(AppError::authentication("Issued token could not be decoded"));
        };

        let id = Uuid::new_v4();
        let events = SessionEvents::new(id, self.events.clone());

        let scheduler = Arc::new(SessionRefreshScheduler::new(
            Arc::clone(&self.store),
            Arc::clone(&self.refresher),
            Arc::clone(&self.clock),
            RefreshSettings::from(&self.config),
            events.clone(),
        ));
        let idle = IdleMonitor::new(
            Arc::clone(&self.store),
            self.hub.clone(),
            IdleSettings::from(&self.config),
            events.clone(),
            self.gate.login().clone(),
        );

        if let Err(e) = idle.start() {
            self.store.clear_token();
            return Err(e);
        }
        if let Err(e) = scheduler.start() {
            idle.stop().await;
            self.store.clear_token();
            return Err(e);
        }

        info!(session_id = %id, subject = %claims.sub, role = ?claims.role_id, "Session started");
        events.publish(SessionEvent::Started {
            subject: claims.sub.clone(),
        });

        *active = Some(ActiveSession {
            id,
            events,
            scheduler,
            idle,
            profile: None,
        });
        Ok(id)
    }

    /// Ends the current login: stops background tasks and clears the token.
    ///
    /// Returns where the navigation layer should go next. Safe to call
    /// with no active login.
    pub async fn logout(&self) -> Destination {
        let previous = self.active.lock().await.take();
        self.store.clear_token();

        if let Some(session) = previous {
            Self::teardown(&session).await;
            info!(session_id = %session.id, "Session logged out");
            session.events.publish(SessionEvent::LoggedOut {
                redirect: self.gate.login().clone(),
            });
        }

        self.gate.login().clone()
    }

    async fn teardown(session: &ActiveSession) {
        session.scheduler.stop().await;
        session.idle.stop().await;
    }

    /// Claims of the live session, or `None` once the token is gone,
    /// malformed, or past its expiry.
    pub fn claims(&self) -> Option<Claims> {
        self.store.active_claims(self.clock.now_ms())
    }

    /// Whether a live session exists.
    pub fn is_authenticated(&self) -> bool {
        self.claims().is_some()
    }

    /// Identifier of the current login.
    ///
    /// A login ended by the idle monitor is still reported here, with its
    /// idle phase at `Expired`, until `logout` or the next `begin`.
    pub async fn session_id(&self) -> Option<Uuid> {
        self.active.lock().await.as_ref().map(|s| s.id)
    }

    /// Gates a navigation request.
    ///
    /// The role comes from the token's role claim, falling back to the
    /// cached user profile when the token carries none.
    pub async fn authorize(&self, destination: &Destination) -> GateDecision {
        let access = match self.claims() {
            None => Access::Anonymous,
            Some(claims) => {
                let role = match claims.role_id {
                    Some(role) => Some(role),
                    None => self.current_user().await.ok().and_then(|p| p.role_id),
                };
                Access::Authenticated(role)
            }
        };

        let decision = self.gate.decide_access(access, destination);
        if let GateDecision::DenyRedirect(target) = &decision {
            info!(destination = %destination, redirect = %target, "Navigation denied");
        }
        decision
    }

    /// Profile of the signed-in user, fetched once per login.
    pub async fn current_user(&self) -> AppResult<UserProfile> {
        let claims = self
            .claims()
            .ok_or_else(|| AppError::authentication("No active session"))?;

        let session_id = {
            let active = self.active.lock().await;
            let session = active
                .as_ref()
                .ok_or_else(|| AppError::authentication("No active session"))?;
            if let Some(profile) = &session.profile {
                return Ok(profile.clone());
            }
            session.id
        };

        let profile = self
            .directory
            .get_user_by_id(claims.subject_id())
            .await
            .inspect_err(|e| warn!(subject = %claims.sub, error = %e, "User lookup failed"))?;

        let mut active = self.active.lock().await;
        if let Some(session) = active.as_mut().filter(|s| s.id == session_id) {
            session.profile = Some(profile.clone());
        }
        Ok(profile)
    }

    /// Records a user interaction.
    pub fn record_activity(&self, kind: ActivityKind) {
        self.hub.record(kind);
    }

    /// Idle state of the current login, including one that has expired.
    pub async fn idle_state(&self) -> Option<IdleState> {
        self.active.lock().await.as_ref().map(|s| s.idle.state())
    }

    /// Forces an immediate token refresh.
    ///
    /// The session lock is released before the backend call, so a logout
    /// issued meanwhile proceeds and the late result is discarded.
    pub async fn refresh_now(&self) -> AppResult<TickOutcome> {
        let scheduler = self
            .active
            .lock()
            .await
            .as_ref()
            .map(|s| Arc::clone(&s.scheduler))
            .ok_or_else(|| AppError::session("No active session to refresh"))?;
        Ok(scheduler.refresh_now().await)
    }

    /// Subscribes to session events for every login.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotice> {
        self.events.subscribe()
    }

    /// The activity hub feeding idle monitors.
    pub fn activity(&self) -> &ActivityHub {
        &self.hub
    }

    /// The navigation gate.
    pub fn gate(&self) -> &RoleGate {
        &self.gate
    }

    /// The shared token store.
    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }
}
