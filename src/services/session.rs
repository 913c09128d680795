//! Session controller — wallet-auth lifecycle and user-record bootstrap.
//!
//! ARCHITECTURE
//! ============
//! The controller is built from injected parts (auth capability, device
//! store, database pool, shared state); it owns no globals. It drives the
//! phase machine `Uninitialized -> Initializing -> {Authenticated,
//! Unauthenticated}` and performs the lazy user-record creation side
//! effect whenever a fresh email-bearing identity is adopted.
//!
//! ERROR HANDLING
//! ==============
//! Failures are logged where they happen and returned as typed results;
//! no call panics or leaves the phase machine half-transitioned. The one
//! fully swallowed class is a duplicate-email conflict during lazy user
//! creation: the record already exists, so the session continues.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::services::auth::{AuthCapability, AuthError, ProviderHandle};
use crate::services::device::{DeviceStore, USER_EMAIL_KEY};
use crate::services::store::{self, StoreError};
use crate::state::{Identity, SessionPhase, SessionState};

/// Display name recorded for identities that carry an email but no name.
const ANONYMOUS_USER_NAME: &str = "Anonymous user";

/// Error surfaced by session lifecycle calls. Callers decide whether to
/// retry or ignore; the default posture is best-effort, so ignoring is
/// always safe.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub struct SessionController {
    auth: Arc<dyn AuthCapability>,
    device: Arc<dyn DeviceStore>,
    pool: PgPool,
    state: SessionState,
}

impl SessionController {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthCapability>,
        device: Arc<dyn DeviceStore>,
        pool: PgPool,
        state: SessionState,
    ) -> Self {
        Self { auth, device, pool, state }
    }

    /// Shared state handle, for display layers and the refresh task.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Provider handle of the connected session, if any.
    #[must_use]
    pub fn provider(&self) -> Option<ProviderHandle> {
        self.auth.provider()
    }

    /// Acquire the auth capability and restore any existing session.
    ///
    /// On init failure the phase lands on `Unauthenticated` with no
    /// identity: definitely not loading, definitely not logged in.
    ///
    /// # Errors
    ///
    /// Returns the capability's init error; the controller stays usable
    /// and a later `login()` may still succeed.
    pub async fn initialize(&self) -> Result<(), SessionError> {
        self.state.set_phase(SessionPhase::Initializing).await;

        if let Err(e) = self.auth.init().await {
            warn!(error = %e, "auth capability initialization failed");
            self.state.set_phase(SessionPhase::Unauthenticated).await;
            return Err(e.into());
        }

        if self.auth.connected() {
            self.state.set_phase(SessionPhase::Authenticated).await;
            match self.auth.user_info().await {
                Ok(identity) => self.adopt_identity(identity).await,
                Err(e) => warn!(error = %e, "identity fetch failed for restored session"),
            }
        } else {
            self.state.set_phase(SessionPhase::Unauthenticated).await;
        }

        Ok(())
    }

    /// Run the interactive connect flow and adopt the resulting identity.
    ///
    /// # Errors
    ///
    /// Returns the connect error; session state is left unchanged, so the
    /// caller observes `loggedIn` simply failing to advance.
    pub async fn login(&self) -> Result<(), SessionError> {
        let provider = match self.auth.connect().await {
            Ok(provider) => provider,
            Err(e) => {
                warn!(error = %e, "login failed");
                return Err(e.into());
            }
        };

        debug!(provider_id = %provider.id(), "wallet connected");
        self.state.set_phase(SessionPhase::Authenticated).await;

        match self.auth.user_info().await {
            Ok(identity) => self.adopt_identity(identity).await,
            Err(e) => warn!(error = %e, "identity fetch failed after connect"),
        }

        Ok(())
    }

    /// Disconnect and clear all session state.
    ///
    /// # Errors
    ///
    /// Returns the disconnect error; on failure the session state and the
    /// persisted email marker are left untouched.
    pub async fn logout(&self) -> Result<(), SessionError> {
        if let Err(e) = self.auth.disconnect().await {
            warn!(error = %e, "logout failed; session state unchanged");
            return Err(e.into());
        }

        self.state.clear_identity().await;
        self.state.set_phase(SessionPhase::Unauthenticated).await;
        self.device.remove(USER_EMAIL_KEY);
        info!("session cleared");
        Ok(())
    }

    /// Re-fetch and adopt the identity.
    ///
    /// EDGE: the guard is deliberately inverted and kept that way —
    /// identity is fetched only while the capability reports NOT
    /// connected, so callers hoping to refresh a connected session's
    /// profile observe no update.
    ///
    /// # Errors
    ///
    /// Returns the identity-fetch error; state is unchanged on failure.
    pub async fn refresh_identity(&self) -> Result<(), SessionError> {
        if self.auth.connected() {
            return Ok(());
        }

        match self.auth.user_info().await {
            Ok(identity) => {
                self.adopt_identity(identity).await;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "identity refresh failed");
                Err(e.into())
            }
        }
    }

    /// Fire-and-forget mark-read. The local unread list is not touched;
    /// the next poll cycle reflects the change.
    pub fn mark_notification_read(&self, notification_id: i32) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            if let Err(e) = store::mark_notification_as_read(&pool, notification_id).await {
                warn!(error = %e, notification_id, "mark-read failed");
            }
        });
    }

    /// Adopt an identity: publish it to the shared state, then persist the
    /// email marker and lazily create the user record when an email is known.
    async fn adopt_identity(&self, identity: Identity) {
        let email = identity.email.clone();
        let name = identity.name.clone();
        self.state.set_identity(identity).await;

        if let Some(email) = email {
            self.device.set(USER_EMAIL_KEY, &email);
            let name = name.unwrap_or_else(|| ANONYMOUS_USER_NAME.to_owned());
            self.ensure_user_record(&email, &name).await;
        }
    }

    /// Exactly one creation attempt per adopted identity. A duplicate
    /// email means the record already exists and is not an error here.
    async fn ensure_user_record(&self, email: &str, name: &str) {
        match store::create_user(&self.pool, email, name).await {
            Ok(user) => info!(user_id = user.id, "user record created"),
            Err(StoreError::DuplicateEmail(_)) => debug!(email, "user record already exists"),
            Err(e) => warn!(error = %e, "user record creation failed; continuing best-effort"),
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
