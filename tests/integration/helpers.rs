//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header, encode};
use tokio::sync::{Notify, broadcast};

use adminhub_auth::{SessionManager, TokenStore};
use adminhub_core::config::{GateConfig, RouteRule, SessionConfig};
use adminhub_core::error::AppError;
use adminhub_core::events::{SessionEvent, SessionNotice};
use adminhub_core::result::AppResult;
use adminhub_core::traits::{ManualClock, RefreshedToken, TokenRefresher, UserDirectory};
use adminhub_core::types::{RoleId, UserProfile};

/// Wall-clock start of every test session (epoch milliseconds).
pub const NOW: i64 = 1_700_000_000_000;

/// Builds an HS256 token for `sub` expiring at `exp_ms`.
pub fn token(sub: &str, exp_ms: i64, role: Option<i64>) -> String {
    let claims = serde_json::json!({
        "sub": sub,
        "exp": exp_ms / 1000,
        "roleId": role,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"adminhub-test-secret"),
    )
    .expect("failed to encode jwt")
}

/// Backend double: scripted refresh results and a fixed user record.
#[derive(Default)]
pub struct FakeBackend {
    /// Results handed out in order; an empty queue means failure.
    script: Mutex<VecDeque<AppResult<String>>>,
    /// When set, each refresh waits for a permit before answering.
    gate: Option<Arc<Notify>>,
    /// Number of refresh calls.
    pub refresh_calls: AtomicU32,
    /// Number of user lookups.
    pub lookups: AtomicU32,
    /// Role reported in the user record.
    pub profile_role: Option<RoleId>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn push_token(&self, token: String) {
        self.script.lock().unwrap().push_back(Ok(token));
    }

    pub fn push_failure(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(AppError::external_service(message)));
    }

    pub fn refresh_calls(&self) -> u32 {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for FakeBackend {
    async fn refresh(&self, _subject: &str) -> AppResult<RefreshedToken> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(access_token)) => Ok(RefreshedToken { access_token }),
            Some(Err(e)) => Err(e),
            None => Err(AppError::external_service("refresh endpoint unreachable")),
        }
    }
}

#[async_trait]
impl UserDirectory for FakeBackend {
    async fn get_user_by_id(&self, subject_id: &str) -> AppResult<UserProfile> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(UserProfile {
            id: subject_id.to_string(),
            name: "Lucía".into(),
            surnames: "Ortega".into(),
            phone: None,
            role_id: self.profile_role,
            avatar: None,
        })
    }
}

/// Gate configuration used across the tests: `/users` is admin-only and
/// `/settings` is open to roles 1 and 2.
pub fn gate_config() -> GateConfig {
    GateConfig {
        routes: vec![
            RouteRule {
                path: "/users".into(),
                roles: vec![1],
            },
            RouteRule {
                path: "/settings".into(),
                roles: vec![1, 2],
            },
        ],
        ..GateConfig::default()
    }
}

/// A manager over in-memory storage with a manual clock at [`NOW`].
pub struct TestSession {
    pub manager: Arc<SessionManager>,
    pub backend: Arc<FakeBackend>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<TokenStore>,
}

impl TestSession {
    pub fn new(backend: FakeBackend) -> Self {
        Self::with_config(backend, SessionConfig::default())
    }

    pub fn with_config(backend: FakeBackend, config: SessionConfig) -> Self {
        let backend = Arc::new(backend);
        let clock = Arc::new(ManualClock::new(NOW));
        let store = Arc::new(TokenStore::in_memory());
        let manager = Arc::new(SessionManager::new(
            Arc::clone(&store),
            Arc::clone(&backend) as Arc<dyn TokenRefresher>,
            Arc::clone(&backend) as Arc<dyn UserDirectory>,
            Arc::clone(&clock) as Arc<dyn adminhub_core::traits::Clock>,
            config,
            &gate_config(),
        )
        .expect("valid session config"));
        Self {
            manager,
            backend,
            clock,
            store,
        }
    }
}

/// Waits for the next event matching `predicate`, skipping the rest.
pub async fn next_matching(
    events: &mut broadcast::Receiver<SessionNotice>,
    predicate: impl Fn(&SessionEvent) -> bool,
) -> SessionEvent {
    loop {
        let notice = events.recv().await.expect("event channel closed");
        if predicate(&notice.event) {
            return notice.event;
        }
    }
}
