//! Integration tests for the session lifecycle: refresh, logout, gating.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use adminhub_auth::{GateDecision, TickOutcome};
use adminhub_core::config::SessionConfig;
use adminhub_core::error::ErrorKind;
use adminhub_core::events::SessionEvent;
use adminhub_core::types::{Destination, RoleId};

use helpers::{FakeBackend, NOW, TestSession, gate_config, next_matching, token};

#[tokio::test(start_paused = true)]
async fn test_token_inside_threshold_refreshes_on_first_tick() {
    let backend = FakeBackend::new();
    backend.push_token(token("7", NOW + 3_600_000, Some(2)));
    let session = TestSession::new(backend);
    let mut events = session.manager.subscribe();

    session
        .manager
        .begin(token("7", NOW + 90_000, Some(2)))
        .await
        .unwrap();

    let event = next_matching(&mut events, |e| {
        matches!(e, SessionEvent::TokenRefreshed { .. })
    })
    .await;
    assert_eq!(
        event,
        SessionEvent::TokenRefreshed {
            expires_at_ms: Some(NOW + 3_600_000)
        }
    );
    assert_eq!(session.backend.refresh_calls(), 1);
    assert_eq!(
        session.store.decode().unwrap().expires_at_ms(),
        NOW + 3_600_000
    );

    session.manager.logout().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_refreshes_keep_token_until_natural_expiry() {
    let backend = FakeBackend::new();
    for attempt in 1..=3 {
        backend.push_failure(&format!("gateway timeout #{attempt}"));
    }
    let session = TestSession::new(backend);
    let mut events = session.manager.subscribe();
    let issued = token("11", NOW + 90_000, Some(1));

    session.manager.begin(&issued).await.unwrap();

    for attempt in 1..=3 {
        let event = next_matching(&mut events, |e| {
            matches!(e, SessionEvent::RefreshFailed { .. })
        })
        .await;
        assert_eq!(
            event,
            SessionEvent::RefreshFailed {
                message: format!("gateway timeout #{attempt}")
            }
        );
        assert_eq!(session.store.get_token().as_deref(), Some(issued.as_str()));
        assert!(session.store.decode().is_some());
        assert!(session.manager.is_authenticated());
    }
    assert_eq!(session.backend.refresh_calls(), 3);

    session.clock.advance(90_000);
    assert!(!session.manager.is_authenticated());
    assert!(session.manager.claims().is_none());
    assert_eq!(
        session.manager.authorize(&Destination::new("/clients")).await,
        GateDecision::DenyRedirect(Destination::new("/login"))
    );

    session.manager.logout().await;
}

#[tokio::test(start_paused = true)]
async fn test_expired_token_is_refreshed_not_dropped() {
    let backend = FakeBackend::new();
    backend.push_token(token("4", NOW + 3_600_000, Some(1)));
    let session = TestSession::new(backend);
    let mut events = session.manager.subscribe();

    session
        .manager
        .begin(token("4", NOW - 5_000, Some(1)))
        .await
        .unwrap();
    assert!(!session.manager.is_authenticated());

    next_matching(&mut events, |e| {
        matches!(e, SessionEvent::TokenRefreshed { .. })
    })
    .await;
    assert!(session.manager.is_authenticated());

    session.manager.logout().await;
}

#[tokio::test(start_paused = true)]
async fn test_logout_during_refresh_discards_late_token() {
    let gate = Arc::new(Notify::new());
    let backend = FakeBackend::gated(Arc::clone(&gate));
    backend.push_token(token("5", NOW + 7_200_000, Some(1)));
    let session = TestSession::new(backend);
    let mut events = session.manager.subscribe();

    session
        .manager
        .begin(token("5", NOW + 3_600_000, Some(1)))
        .await
        .unwrap();

    let manager = Arc::clone(&session.manager);
    let pending = tokio::spawn(async move { manager.refresh_now().await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(session.backend.refresh_calls(), 1);

    let redirect = session.manager.logout().await;
    assert_eq!(redirect, Destination::new("/login"));

    gate.notify_one();
    let outcome = pending.await.unwrap().unwrap();
    assert!(matches!(outcome, TickOutcome::Discarded));
    assert_eq!(session.store.get_token(), None);
    assert!(!session.manager.is_authenticated());

    next_matching(&mut events, |e| matches!(e, SessionEvent::RefreshDiscarded)).await;
}

#[tokio::test(start_paused = true)]
async fn test_gate_decisions_follow_token_role() {
    let session = TestSession::new(FakeBackend::new());
    let dest = |p: &str| Destination::new(p);

    for path in ["/users", "/clients", "/login"] {
        assert_eq!(
            session.manager.authorize(&dest(path)).await,
            GateDecision::DenyRedirect(dest("/login")),
            "anonymous access to {path}"
        );
    }

    session
        .manager
        .begin(token("2", NOW + 3_600_000, Some(2)))
        .await
        .unwrap();

    assert_eq!(
        session.manager.authorize(&dest("/users")).await,
        GateDecision::DenyRedirect(dest("/not-authorized"))
    );
    assert_eq!(
        session.manager.authorize(&dest("/users/42/edit")).await,
        GateDecision::DenyRedirect(dest("/not-authorized"))
    );
    assert!(session.manager.authorize(&dest("/settings")).await.is_allowed());
    assert!(session.manager.authorize(&dest("/clients")).await.is_allowed());
    assert!(session.manager.authorize(&dest("/usersettings")).await.is_allowed());

    session.manager.logout().await;
    assert_eq!(
        session.manager.authorize(&dest("/settings")).await,
        GateDecision::DenyRedirect(dest("/login"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_role_falls_back_to_user_record() {
    let mut backend = FakeBackend::new();
    backend.profile_role = Some(RoleId(1));
    let session = TestSession::new(backend);

    session
        .manager
        .begin(token("30", NOW + 3_600_000, None))
        .await
        .unwrap();

    assert!(
        session
            .manager
            .authorize(&Destination::new("/users"))
            .await
            .is_allowed()
    );
    let user = session.manager.current_user().await.unwrap();
    assert_eq!(user.id, "30");
    assert_eq!(user.display_name(), "Lucía Ortega");
    assert_eq!(
        session
            .backend
            .lookups
            .load(std::sync::atomic::Ordering::SeqCst),
        1
    );

    session.manager.logout().await;
}

#[test]
fn test_zero_refresh_interval_is_a_configuration_error() {
    let backend = Arc::new(FakeBackend::new());
    let config = SessionConfig {
        refresh_interval_ms: 0,
        ..SessionConfig::default()
    };

    let result = adminhub_auth::SessionManager::new(
        Arc::new(adminhub_auth::TokenStore::in_memory()),
        Arc::clone(&backend) as Arc<dyn adminhub_core::traits::TokenRefresher>,
        backend as Arc<dyn adminhub_core::traits::UserDirectory>,
        Arc::new(adminhub_core::traits::ManualClock::new(NOW)),
        config,
        &gate_config(),
    );
    assert_eq!(result.unwrap_err().kind, ErrorKind::Configuration);
}

#[tokio::test(start_paused = true)]
async fn test_token_with_redundant_role_claims_starts_a_session() {
    let session = TestSession::new(FakeBackend::new());
    let payload = serde_json::json!({
        "sub": "7",
        "exp": (NOW + 3_600_000) as f64 / 1000.0 + 0.5,
        "roleId": 1,
        "role": "admin",
    });
    let issued = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &payload,
        &jsonwebtoken::EncodingKey::from_secret(b"adminhub-test-secret"),
    )
    .unwrap();

    session.manager.begin(issued).await.unwrap();
    let claims = session.manager.claims().unwrap();
    assert_eq!(claims.role_id, Some(RoleId(1)));
    assert_eq!(claims.exp, (NOW + 3_600_000) / 1000);
    assert!(
        session
            .manager
            .authorize(&Destination::new("/users"))
            .await
            .is_allowed()
    );

    session.manager.logout().await;
}
