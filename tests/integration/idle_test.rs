//! Integration tests for inactivity warnings and forced logout.

mod helpers;

use std::time::Duration;

use tokio::time::sleep;

use adminhub_auth::{ActivityKind, IdlePhase};
use adminhub_core::config::SessionConfig;
use adminhub_core::events::SessionEvent;
use adminhub_core::types::Destination;

use helpers::{FakeBackend, NOW, TestSession, next_matching, token};

async fn phase(session: &TestSession) -> IdlePhase {
    session.manager.idle_state().await.unwrap().phase
}

#[tokio::test(start_paused = true)]
async fn test_warning_then_activity_resets_timer() {
    let session = TestSession::new(FakeBackend::new());
    let mut events = session.manager.subscribe();
    session
        .manager
        .begin(token("1", NOW + 7_200_000, Some(1)))
        .await
        .unwrap();

    sleep(Duration::from_millis(569_000)).await;
    assert_eq!(phase(&session).await, IdlePhase::Active);

    sleep(Duration::from_millis(1_500)).await;
    assert_eq!(phase(&session).await, IdlePhase::Warning);
    let warning = next_matching(&mut events, |e| {
        matches!(e, SessionEvent::IdleWarning { .. })
    })
    .await;
    let SessionEvent::IdleWarning { remaining_ms } = warning else {
        unreachable!()
    };
    assert!((29_000..=30_000).contains(&remaining_ms), "{remaining_ms}");

    session.manager.record_activity(ActivityKind::KeyPress);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(phase(&session).await, IdlePhase::Active);
    next_matching(&mut events, |e| matches!(e, SessionEvent::ActivityResumed)).await;

    // A full warning window later the session is still alive.
    sleep(Duration::from_millis(60_000)).await;
    assert_eq!(phase(&session).await, IdlePhase::Active);
    assert!(session.manager.is_authenticated());

    session.manager.logout().await;
}

#[tokio::test(start_paused = true)]
async fn test_inactivity_ends_session_and_detaches_listener() {
    let session = TestSession::new(FakeBackend::new());
    let mut events = session.manager.subscribe();
    let login = session
        .manager
        .begin(token("1", NOW + 7_200_000, Some(1)))
        .await
        .unwrap();
    assert_eq!(session.manager.activity().listener_count(), 1);

    let expired = next_matching(&mut events, |e| {
        matches!(e, SessionEvent::IdleExpired { .. })
    })
    .await;
    assert_eq!(expired.redirect(), Some(&Destination::new("/login")));

    sleep(Duration::from_millis(10)).await;
    assert_eq!(phase(&session).await, IdlePhase::Expired);
    assert_eq!(session.store.get_token(), None);
    assert!(!session.manager.is_authenticated());
    assert_eq!(session.manager.activity().listener_count(), 0);
    // The expired login stays visible until logout.
    assert_eq!(session.manager.session_id().await, Some(login));

    // Activity after expiry changes nothing.
    session.manager.record_activity(ActivityKind::Click);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(phase(&session).await, IdlePhase::Expired);

    assert_eq!(session.manager.logout().await, Destination::new("/login"));
    assert_eq!(session.manager.session_id().await, None);
    assert!(session.manager.idle_state().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_steady_activity_keeps_session_alive() {
    let session = TestSession::new(FakeBackend::new());
    session
        .manager
        .begin(token("1", NOW + 7_200_000, Some(1)))
        .await
        .unwrap();

    for _ in 0..5 {
        sleep(Duration::from_millis(500_000)).await;
        session.manager.record_activity(ActivityKind::PointerMove);
    }
    sleep(Duration::from_millis(10)).await;

    assert_eq!(phase(&session).await, IdlePhase::Active);
    assert!(session.store.has_token());

    session.manager.logout().await;
}

#[tokio::test(start_paused = true)]
async fn test_configured_timeouts_apply() {
    let config = SessionConfig {
        idle_timeout_ms: 60_000,
        idle_warning_lead_ms: 10_000,
        ..SessionConfig::default()
    };
    let session = TestSession::with_config(FakeBackend::new(), config);
    let mut events = session.manager.subscribe();
    session
        .manager
        .begin(token("1", NOW + 7_200_000, Some(1)))
        .await
        .unwrap();

    sleep(Duration::from_millis(50_500)).await;
    assert_eq!(phase(&session).await, IdlePhase::Warning);

    next_matching(&mut events, |e| matches!(e, SessionEvent::IdleExpired { .. })).await;
    assert_eq!(session.store.get_token(), None);

    session.manager.logout().await;
}
