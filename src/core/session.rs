//! Session Storage
//!
//! Per-browser-session key/value storage owned by the host.

use std::collections::HashMap;
use std::sync::Mutex;

/// Session storage interface (for dependency injection).
///
/// A handle is scoped to one browser session; values are not shared between
/// end users.
pub trait SessionStore: Send + Sync {
    /// Store a value, replacing any previous one.
    fn set_session_value(&self, key: &str, value: String);

    /// Read a value.
    fn get_session_value(&self, key: &str) -> Option<String>;

    /// Remove and return a value.
    fn remove_session_value(&self, key: &str) -> Option<String>;
}

#[cfg(test)]
mockall::mock! {
    pub SessionStore {}

    impl SessionStore for SessionStore {
        fn set_session_value(&self, key: &str, value: String);
        fn get_session_value(&self, key: &str) -> Option<String>;
        fn remove_session_value(&self, key: &str) -> Option<String>;
    }
}

/// In-memory session.
#[derive(Debug, Default)]
pub struct InMemorySession {
    values: Mutex<HashMap<String, String>>,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySession {
    fn set_session_value(&self, key: &str, value: String) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
    }

    fn get_session_value(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn remove_session_value(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key)
    }
}
