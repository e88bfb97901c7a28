//! Auth0 Login
//!
//! Login initiation and error bookkeeping for a site that delegates sign-in to
//! an Auth0 tenant.
//!
//! # Features
//!
//! - Authorization Code flow (`response_type=code`)
//! - OIDC Implicit flow (`response_type=id_token` with a nonce)
//! - CSRF state and nonce round-tripped through the user's session
//! - Scope and authorize-parameter extension hooks
//! - Bounded, deduplicated error log kept in the host's option store
//! - Management API caller that records its failures
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use auth0_login::{login_config, Auth0Login, HookRegistry, InMemoryOptionStore, InMemorySession};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = login_config()
//!         .domain("tenant.auth0.com")
//!         .client_id("my-client-id")
//!         .site_url("https://example.org")
//!         .build();
//!
//!     let mut hooks = HookRegistry::new();
//!     hooks.on_scope(|mut scope, _context| {
//!         scope.push("offline_access".to_string());
//!         scope
//!     });
//!
//!     let client = Auth0Login::new(config, hooks, Arc::new(InMemoryOptionStore::new()))?;
//!     let session = Arc::new(InMemorySession::new());
//!
//!     let url = client.build_authorize_url(session, Some("github"), None)?;
//!     println!("Redirect to: {}", url);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: configuration, authorization parameter and error log types
//! - `error`: error hierarchy
//! - `core`: collaborator interfaces (option store, session, hooks, HTTP) and
//!   the scope and state/nonce building blocks
//! - `flows`: authorization request construction
//! - `error_log`: error log store and recorder
//! - `api`: management API caller
//! - `builders`: fluent configuration builder
//! - `client`: high-level client combining all functionality

pub mod api;
pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod error_log;
pub mod flows;
pub mod types;

// Re-export main client
pub use client::Auth0Login;

// Re-export builders
pub use builders::{login_config, LoginConfigBuilder};

// Re-export errors
pub use error::{
    ConfigurationError, LoginError, NetworkError, ProtocolError, StorageError,
};

// Re-export types
pub use types::{
    // Config
    FlowMode, LoginConfig, OptionKeys, DEFAULT_CLIENT_NAME,
    // Auth
    AuthorizationParameters, ParamNames,
    // Error log
    sanitize_text_field, ErrorCandidate, ErrorInput, ErrorLogEntry, UNKNOWN_CODE, UNKNOWN_MESSAGE,
};

// Re-export core components
pub use crate::core::{
    // Clock
    Clock, ManualClock, SystemClock,
    // Hooks
    AuthorizeParamsHook, HookName, HookRegistry, ScopeHook,
    // Scope
    ScopeResolver, DEFAULT_SCOPES,
    // Session
    InMemorySession, SessionStore,
    // State
    MockTokenSource, RandomTokenSource, StateNonceGenerator, TokenSource, NONCE_SESSION_KEY,
    STATE_SESSION_KEY,
    // Options
    FileOptionStore, InMemoryOptionStore, MockOptionStore, OptionStore,
    // Transport
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport,
};

// Re-export flows
pub use flows::{AuthorizationRequestBuilder, AUTH_SCOPE_CONTEXT};

// Re-export error log
pub use error_log::{
    ErrorLogSnapshot, ErrorLogStore, ErrorRecorder, ERROR_LOG_OPTION, MAX_ERROR_LOG_ENTRIES,
};

// Re-export management API
pub use api::{encode_path_segment, ApiErrorBody, ManagementApi};
