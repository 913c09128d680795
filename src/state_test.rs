use super::*;
use super::test_helpers::{dummy_notification, identity};

// =============================================================================
// Phase machine
// =============================================================================

#[tokio::test]
async fn new_state_is_uninitialized_and_empty() {
    let state = SessionState::new();
    assert_eq!(state.phase().await, SessionPhase::Uninitialized);
    assert_eq!(state.identity().await, None);
    assert_eq!(state.balance().await, 0);
    assert!(state.notifications().await.is_empty());
}

#[tokio::test]
async fn set_phase_is_observable() {
    let state = SessionState::new();
    state.set_phase(SessionPhase::Initializing).await;
    assert_eq!(state.phase().await, SessionPhase::Initializing);
    state.set_phase(SessionPhase::Authenticated).await;
    assert_eq!(state.phase().await, SessionPhase::Authenticated);
}

#[test]
fn phase_serializes_lowercase() {
    let json = serde_json::to_string(&SessionPhase::Unauthenticated).unwrap();
    assert_eq!(json, "\"unauthenticated\"");
}

// =============================================================================
// Identity and epoch
// =============================================================================

#[tokio::test]
async fn set_identity_bumps_epoch_and_publishes() {
    let state = SessionState::new();
    let mut rx = state.subscribe_identity();
    let before = state.epoch().await;

    state.set_identity(identity("a@example.com")).await;

    assert_eq!(state.epoch().await, before + 1);
    rx.changed().await.unwrap();
    assert_eq!(
        rx.borrow().as_ref().and_then(|i| i.email.clone()),
        Some("a@example.com".to_owned())
    );
}

#[tokio::test]
async fn keyed_email_returns_email_with_current_epoch() {
    let state = SessionState::new();
    assert_eq!(state.keyed_email().await, None);

    state.set_identity(identity("a@example.com")).await;
    let (email, epoch) = state.keyed_email().await.unwrap();
    assert_eq!(email, "a@example.com");
    assert_eq!(epoch, state.epoch().await);
}

#[tokio::test]
async fn keyed_email_is_none_for_emailless_identity() {
    let state = SessionState::new();
    state.set_identity(test_helpers::emailless_identity()).await;
    assert_eq!(state.keyed_email().await, None);
}

#[tokio::test]
async fn clear_identity_resets_derived_state() {
    let state = SessionState::new();
    state.set_identity(identity("a@example.com")).await;
    state.apply_balance_override(50).await;
    let epoch = state.epoch().await;
    state.store_notifications(epoch, vec![dummy_notification(1, 1)]).await;

    state.clear_identity().await;

    assert_eq!(state.identity().await, None);
    assert_eq!(state.balance().await, 0);
    assert!(state.notifications().await.is_empty());
    assert_eq!(state.epoch().await, epoch + 1);
}

// =============================================================================
// Notification staleness guard
// =============================================================================

#[tokio::test]
async fn store_notifications_applies_for_current_epoch() {
    let state = SessionState::new();
    state.set_identity(identity("a@example.com")).await;
    let epoch = state.epoch().await;

    assert!(state.store_notifications(epoch, vec![dummy_notification(1, 1)]).await);
    assert_eq!(state.notifications().await.len(), 1);
}

#[tokio::test]
async fn store_notifications_drops_superseded_epoch() {
    let state = SessionState::new();
    state.set_identity(identity("a@example.com")).await;
    let stale_epoch = state.epoch().await;

    // Identity changed while the fetch was in flight.
    state.set_identity(identity("b@example.com")).await;

    assert!(!state.store_notifications(stale_epoch, vec![dummy_notification(1, 1)]).await);
    assert!(state.notifications().await.is_empty());
}

// =============================================================================
// Balance: fetch vs override ordering
// =============================================================================

#[tokio::test]
async fn balance_fetch_applies_when_nothing_intervened() {
    let state = SessionState::new();
    state.set_identity(identity("a@example.com")).await;

    let token = state.begin_balance_fetch().await;
    assert!(state.complete_balance_fetch(token, 17).await);
    assert_eq!(state.balance().await, 17);
}

#[tokio::test]
async fn override_wins_over_in_flight_fetch() {
    let state = SessionState::new();
    state.set_identity(identity("a@example.com")).await;

    let token = state.begin_balance_fetch().await;
    state.apply_balance_override(42).await;

    // The fetch resolves later with a different value and must lose.
    assert!(!state.complete_balance_fetch(token, 7).await);
    assert_eq!(state.balance().await, 42);
}

#[tokio::test]
async fn identity_change_invalidates_in_flight_fetch() {
    let state = SessionState::new();
    state.set_identity(identity("a@example.com")).await;

    let token = state.begin_balance_fetch().await;
    state.set_identity(identity("b@example.com")).await;

    assert!(!state.complete_balance_fetch(token, 99).await);
    assert_eq!(state.balance().await, 0);
}

#[tokio::test]
async fn fetch_after_override_applies_normally() {
    let state = SessionState::new();
    state.set_identity(identity("a@example.com")).await;
    state.apply_balance_override(42).await;

    let token = state.begin_balance_fetch().await;
    assert!(state.complete_balance_fetch(token, 40).await);
    assert_eq!(state.balance().await, 40);
}

// =============================================================================
// Snapshot
// =============================================================================

#[tokio::test]
async fn snapshot_copies_the_full_surface() {
    let state = SessionState::new();
    state.set_phase(SessionPhase::Authenticated).await;
    state.set_identity(identity("a@example.com")).await;
    state.apply_balance_override(5).await;
    let epoch = state.epoch().await;
    state.store_notifications(epoch, vec![dummy_notification(3, 1)]).await;

    let snap = state.snapshot().await;
    assert_eq!(snap.phase, SessionPhase::Authenticated);
    assert_eq!(snap.identity.and_then(|i| i.email), Some("a@example.com".to_owned()));
    assert_eq!(snap.balance, 5);
    assert_eq!(snap.notifications.len(), 1);
    assert_eq!(snap.notifications[0].id, 3);
}

#[tokio::test]
async fn snapshot_serializes() {
    let state = SessionState::new();
    state.set_identity(identity("a@example.com")).await;
    let json = serde_json::to_value(state.snapshot().await).unwrap();
    assert_eq!(json["identity"]["email"], "a@example.com");
    assert_eq!(json["balance"], 0);
}

// =============================================================================
// Clones share state
// =============================================================================

#[tokio::test]
async fn clones_observe_the_same_inner_state() {
    let state = SessionState::new();
    let other = state.clone();
    other.apply_balance_override(9).await;
    assert_eq!(state.balance().await, 9);
}

#[tokio::test]
async fn default_equals_new() {
    let state = SessionState::default();
    assert_eq!(state.phase().await, SessionPhase::Uninitialized);
    assert_eq!(state.balance().await, 0);
}
