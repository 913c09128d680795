//! Local device storage port.
//!
//! Holds the single cross-reload marker this crate uses: the last
//! authenticated email. Browser hosts bridge this to local storage;
//! everything else (and every test) uses [`MemoryStore`].

use std::collections::HashMap;
use std::sync::Mutex;

/// Storage key for the last-known authenticated email.
pub const USER_EMAIL_KEY: &str = "userEmail";

/// Minimal string key/value storage surface.
pub trait DeviceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Mutex-backed in-memory store for hosts without a storage bridge.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl DeviceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}

#[cfg(test)]
#[path = "device_test.rs"]
mod tests;
