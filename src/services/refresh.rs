//! Notification/balance refresh task.
//!
//! DESIGN
//! ======
//! One background task keeps the two identity-derived values fresh:
//! unread notifications are polled on a fixed interval and on every
//! identity change; the balance is fetched once per identity change and
//! otherwise driven by [`AppEvent::BalanceUpdate`] bus events, which win
//! over any in-flight fetch by arrival order. All writes go through the
//! epoch/generation checks in `SessionState`, so a result keyed by a
//! superseded identity is dropped rather than applied.
//!
//! ERROR HANDLING
//! ==============
//! Store failures are logged and leave the previous values in place; the
//! next cycle retries naturally. An identity email with no matching user
//! record empties the unread list and leaves the balance untouched.

use std::time::Duration;

use sqlx::PgPool;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::events::{AppEvent, EventBus};
use crate::services::store;
use crate::state::SessionState;

const DEFAULT_NOTIFICATION_POLL_SECS: u64 = 30;

/// Tuning knobs for the refresh task, loaded from environment variables.
#[derive(Debug, Clone, Copy)]
pub struct RefreshConfig {
    /// Seconds between notification polls.
    pub poll_secs: u64,
}

impl RefreshConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self { poll_secs: env_parse("NOTIFICATION_POLL_SECS", DEFAULT_NOTIFICATION_POLL_SECS) }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// HANDLE
// =============================================================================

/// Handle to a spawned refresh task. Dropping it aborts the task, so the
/// poll stops together with its owning scope.
pub struct RefreshHandle {
    handle: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// Stop the task and wait for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

// =============================================================================
// TASK
// =============================================================================

/// Spawn the background refresh task.
#[must_use]
pub fn spawn_refresh_task(
    pool: PgPool,
    state: SessionState,
    bus: &EventBus,
    config: RefreshConfig,
) -> RefreshHandle {
    let mut identity_rx = state.subscribe_identity();
    let mut events = bus.subscribe();
    info!(poll_secs = config.poll_secs, "refresh task configured");

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(config.poll_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick resolves immediately; consume it so the loop's ticks
        // land on the configured cadence.
        ticker.tick().await;

        let mut bus_open = true;

        refresh_notifications(&pool, &state).await;
        refresh_balance(&pool, &state).await;

        loop {
            tokio::select! {
                changed = identity_rx.changed() => {
                    if changed.is_err() {
                        // Identity channel closed: the session state is gone.
                        break;
                    }
                    refresh_notifications(&pool, &state).await;
                    refresh_balance(&pool, &state).await;
                }
                _ = ticker.tick() => {
                    refresh_notifications(&pool, &state).await;
                }
                event = events.recv(), if bus_open => {
                    match event {
                        Ok(AppEvent::BalanceUpdate(value)) => {
                            debug!(value, "balance override from event bus");
                            state.apply_balance_override(value).await;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "balance event stream lagged");
                        }
                        Err(RecvError::Closed) => bus_open = false,
                    }
                }
            }
        }
    });

    RefreshHandle { handle: Some(handle) }
}

// =============================================================================
// FETCH CYCLES
// =============================================================================

async fn refresh_notifications(pool: &PgPool, state: &SessionState) {
    let Some((email, epoch)) = state.keyed_email().await else {
        return;
    };

    let user = match store::get_user_by_email(pool, &email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            // No record yet for this identity: display nothing, no error.
            state.store_notifications(epoch, Vec::new()).await;
            return;
        }
        Err(e) => {
            warn!(error = %e, "notification refresh: user lookup failed");
            return;
        }
    };

    match store::get_unread_notifications(pool, user.id).await {
        Ok(list) => {
            if !state.store_notifications(epoch, list).await {
                debug!("notification result for superseded identity dropped");
            }
        }
        Err(e) => warn!(error = %e, user_id = user.id, "notification refresh failed"),
    }
}

async fn refresh_balance(pool: &PgPool, state: &SessionState) {
    let Some((email, _)) = state.keyed_email().await else {
        return;
    };
    let token = state.begin_balance_fetch().await;

    let user = match store::get_user_by_email(pool, &email).await {
        Ok(Some(user)) => user,
        Ok(None) => return,
        Err(e) => {
            warn!(error = %e, "balance refresh: user lookup failed");
            return;
        }
    };

    match store::get_user_balance(pool, user.id).await {
        Ok(value) => {
            if !state.complete_balance_fetch(token, value).await {
                debug!(value, "stale balance fetch dropped");
            }
        }
        Err(e) => warn!(error = %e, user_id = user.id, "balance refresh failed"),
    }
}

#[cfg(test)]
#[path = "refresh_test.rs"]
mod tests;
