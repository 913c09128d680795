//! Domain services behind the session surface.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the auth port, device storage, persistence access
//! functions, and the background refresh loop, so the session controller
//! stays focused on lifecycle orchestration.

pub mod auth;
pub mod device;
pub mod refresh;
pub mod session;
pub mod store;
