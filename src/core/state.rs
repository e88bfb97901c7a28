//! State Management
//!
//! CSRF state and OIDC nonce generation, bound to the caller's session.

use constant_time_eq::constant_time_eq;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::core::session::SessionStore;

/// Session key holding the pending CSRF state.
pub const STATE_SESSION_KEY: &str = "auth0_state";

/// Session key holding the pending nonce.
pub const NONCE_SESSION_KEY: &str = "auth0_nonce";

/// Random bytes per token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Source of unguessable URL-safe tokens (for dependency injection).
pub trait TokenSource: Send + Sync {
    fn token(&self) -> String;
}

/// CSPRNG-backed token source.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomTokenSource;

impl TokenSource for RandomTokenSource {
    fn token(&self) -> String {
        let mut rng = rand::thread_rng();
        let bytes: [u8; TOKEN_BYTES] = rng.gen();
        base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes)
    }
}

/// Mock token source for testing.
#[derive(Debug, Default)]
pub struct MockTokenSource {
    queued: Mutex<VecDeque<String>>,
    counter: AtomicU64,
}

impl MockTokenSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next token to hand out.
    pub fn queue_token(&self, token: impl Into<String>) -> &Self {
        self.queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(token.into());
        self
    }
}

impl TokenSource for MockTokenSource {
    fn token(&self) -> String {
        self.queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| format!("mock-token-{}", self.counter.fetch_add(1, Ordering::SeqCst)))
    }
}

/// Generates the CSRF state and nonce for a login attempt.
///
/// Only one login attempt is tracked per session: a new value replaces any
/// pending one.
pub struct StateNonceGenerator<S: SessionStore> {
    session: Arc<S>,
    source: Arc<dyn TokenSource>,
}

impl<S: SessionStore> StateNonceGenerator<S> {
    /// Create a generator using the CSPRNG source.
    pub fn new(session: Arc<S>) -> Self {
        Self::with_source(session, Arc::new(RandomTokenSource))
    }

    /// Create a generator with a custom token source.
    pub fn with_source(session: Arc<S>, source: Arc<dyn TokenSource>) -> Self {
        Self { session, source }
    }

    /// New CSRF state, stored in the session.
    pub fn new_csrf_state(&self) -> String {
        let state = self.source.token();
        self.session
            .set_session_value(STATE_SESSION_KEY, state.clone());
        debug!("Stored new CSRF state in session");
        state
    }

    /// New nonce for the Implicit flow, stored in the session.
    pub fn new_nonce(&self) -> String {
        let nonce = self.source.token();
        self.session
            .set_session_value(NONCE_SESSION_KEY, nonce.clone());
        nonce
    }

    /// Consume the pending CSRF state. Returns whether `received` matched it.
    pub fn consume_csrf_state(&self, received: &str) -> bool {
        self.consume(STATE_SESSION_KEY, received)
    }

    /// Consume the pending nonce. Returns whether `received` matched it.
    pub fn consume_nonce(&self, received: &str) -> bool {
        self.consume(NONCE_SESSION_KEY, received)
    }

    fn consume(&self, key: &str, received: &str) -> bool {
        match self.session.remove_session_value(key) {
            Some(stored) => constant_time_eq(stored.as_bytes(), received.as_bytes()),
            None => false,
        }
    }
}
