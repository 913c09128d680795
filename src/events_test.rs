use super::*;

// =============================================================================
// Publish/subscribe
// =============================================================================

#[tokio::test]
async fn subscriber_receives_typed_payload() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe();

    bus.publish(AppEvent::BalanceUpdate(42));

    assert_eq!(rx.recv().await.unwrap(), AppEvent::BalanceUpdate(42));
}

#[tokio::test]
async fn publish_without_subscribers_does_not_panic() {
    let bus = EventBus::new();
    bus.publish(AppEvent::BalanceUpdate(1));
}

#[tokio::test]
async fn all_mounted_subscribers_receive_the_event() {
    let bus = EventBus::new();
    let mut a = bus.subscribe();
    let mut b = bus.subscribe();

    bus.publish(AppEvent::BalanceUpdate(7));

    assert_eq!(a.recv().await.unwrap(), AppEvent::BalanceUpdate(7));
    assert_eq!(b.recv().await.unwrap(), AppEvent::BalanceUpdate(7));
}

#[tokio::test]
async fn subscriber_mounted_after_publish_misses_the_event() {
    let bus = EventBus::new();
    bus.publish(AppEvent::BalanceUpdate(7));

    let mut late = bus.subscribe();
    bus.publish(AppEvent::BalanceUpdate(8));
    assert_eq!(late.recv().await.unwrap(), AppEvent::BalanceUpdate(8));
}

#[tokio::test]
async fn dropping_receiver_deregisters() {
    let bus = EventBus::new();
    let rx = bus.subscribe();
    assert_eq!(bus.subscriber_count(), 1);
    drop(rx);
    assert_eq!(bus.subscriber_count(), 0);
}

#[tokio::test]
async fn bus_clones_share_the_channel() {
    let bus = EventBus::new();
    let other = bus.clone();
    let mut rx = bus.subscribe();

    other.publish(AppEvent::BalanceUpdate(3));
    assert_eq!(rx.recv().await.unwrap(), AppEvent::BalanceUpdate(3));
}
