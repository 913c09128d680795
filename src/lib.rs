//! Session and notification synchronization core for a waste-reporting
//! rewards application.
//!
//! ARCHITECTURE
//! ============
//! Three pieces compose by plain caller/callee wiring:
//!
//! - [`SessionController`] drives the wallet-auth lifecycle and mirrors
//!   it into a shared [`SessionState`], lazily creating the user record
//!   on first login with a known email.
//! - [`spawn_refresh_task`] keeps the identity-derived values fresh:
//!   unread notifications on a fixed poll, token balance on identity
//!   changes and typed [`EventBus`] events.
//! - The store module is the only Postgres query surface; everything
//!   else treats persistence as named access functions.
//!
//! External collaborators (the wallet SDK, device storage) enter as
//! injected trait objects with lifecycles owned by the host.

pub mod db;
pub mod events;
pub mod services;
pub mod state;

pub use events::{AppEvent, EventBus};
pub use services::auth::{AuthCapability, AuthError, ChainConfig, ProviderHandle, SEPOLIA};
pub use services::device::{DeviceStore, MemoryStore, USER_EMAIL_KEY};
pub use services::refresh::{RefreshConfig, RefreshHandle, spawn_refresh_task};
pub use services::session::{SessionController, SessionError};
pub use services::store::{Report, StoreError, TransactionKind, User};
pub use state::{Identity, Notification, SessionPhase, SessionSnapshot, SessionState};
