//! Typed application event bus.
//!
//! DESIGN
//! ======
//! Cross-component signals travel over a typed `tokio::broadcast` channel
//! instead of an unscoped, stringly-named process-wide event. Publishers
//! call [`EventBus::publish`]; subscribers hold a receiver and drop it to
//! deregister. A slow subscriber skips lagged events rather than blocking
//! the publisher.

use tokio::sync::broadcast;

const DEFAULT_EVENT_BUS_CAPACITY: usize = 64;

/// Application-wide events with typed payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The user's token balance changed. The payload replaces the locally
    /// displayed balance unconditionally.
    BalanceUpdate(i64),
}

/// Cloneable publish/subscribe handle.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_BUS_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish to all currently mounted subscribers. An event with no
    /// subscribers is dropped silently.
    pub fn publish(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Number of currently mounted subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
