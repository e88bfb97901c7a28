//! Login Client
//!
//! High-level client that ties login initiation and the error log together.

use std::sync::Arc;
use url::Url;

use crate::api::ManagementApi;
use crate::builders::LoginConfigBuilder;
use crate::core::{
    Clock, HookRegistry, HttpTransport, OptionStore, ReqwestHttpTransport, SessionStore,
    SystemClock, DEFAULT_MAX_RESPONSE_SIZE,
};
use crate::error::LoginError;
use crate::error_log::{ErrorLogStore, ErrorRecorder};
use crate::flows::AuthorizationRequestBuilder;
use crate::types::{AuthorizationParameters, ErrorInput, ErrorLogEntry, LoginConfig};

/// Auth0 login client.
///
/// Holds the read-only configuration and hook registry; sessions are passed
/// per request.
pub struct Auth0Login<O: OptionStore, T: HttpTransport = ReqwestHttpTransport> {
    config: Arc<LoginConfig>,
    hooks: Arc<HookRegistry>,
    recorder: Arc<ErrorRecorder<O>>,
    transport: Arc<T>,
}

impl<O: OptionStore> Auth0Login<O, ReqwestHttpTransport> {
    /// Create a client with the default HTTP transport.
    pub fn new(config: LoginConfig, hooks: HookRegistry, options: Arc<O>) -> Result<Self, LoginError> {
        let transport = ReqwestHttpTransport::with_options(config.timeout, DEFAULT_MAX_RESPONSE_SIZE)?;
        Ok(Self::with_components(
            config,
            hooks,
            options,
            Arc::new(transport),
            Arc::new(SystemClock),
        ))
    }

    /// Create a client configured from the host's option store.
    pub fn from_options(options: Arc<O>, hooks: HookRegistry) -> Result<Self, LoginError> {
        let config = LoginConfigBuilder::from_options(options.as_ref())?.build();
        Self::new(config, hooks, options)
    }
}

impl<O: OptionStore, T: HttpTransport> Auth0Login<O, T> {
    /// Create a client with custom implementations.
    pub fn with_components(
        config: LoginConfig,
        hooks: HookRegistry,
        options: Arc<O>,
        transport: Arc<T>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            hooks: Arc::new(hooks),
            recorder: Arc::new(ErrorRecorder::with_clock(options, clock)),
            transport,
        }
    }

    /// Get configuration.
    pub fn config(&self) -> &LoginConfig {
        &self.config
    }

    /// Get the hook registry.
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    // ========== Login Initiation ==========

    /// Request builder bound to one browser session.
    pub fn authorize_request<S: SessionStore>(&self, session: Arc<S>) -> AuthorizationRequestBuilder<S> {
        AuthorizationRequestBuilder::new(self.config.clone(), self.hooks.clone(), session)
    }

    /// Build `/authorize` parameters, storing the new state (and nonce) in `session`.
    pub fn build_authorize_params<S: SessionStore>(
        &self,
        session: Arc<S>,
        connection: Option<&str>,
        redirect_to: Option<&str>,
    ) -> AuthorizationParameters {
        self.authorize_request(session)
            .build_authorize_params(connection, redirect_to)
    }

    /// Build the full `/authorize` URL.
    pub fn build_authorize_url<S: SessionStore>(
        &self,
        session: Arc<S>,
        connection: Option<&str>,
        redirect_to: Option<&str>,
    ) -> Result<Url, LoginError> {
        self.authorize_request(session)
            .build_authorize_url(connection, redirect_to)
    }

    // ========== Error Log ==========

    /// Record a failure into the error log.
    pub fn record_error(&self, section: &str, error: impl Into<ErrorInput>) -> bool {
        self.recorder.record_error(section, error)
    }

    /// Record a failure without losing concurrent updates, where the store allows.
    pub fn record_error_atomic(&self, section: &str, error: impl Into<ErrorInput>) -> bool {
        self.recorder.record_error_atomic(section, error)
    }

    /// Error log, most recent first.
    pub fn get_error_log(&self) -> Vec<ErrorLogEntry> {
        self.recorder.log().get()
    }

    /// Empty the error log.
    pub fn clear_error_log(&self) -> bool {
        self.recorder.log().clear()
    }

    /// Remove the error log option.
    pub fn delete_error_log(&self) -> bool {
        self.recorder.log().delete()
    }

    /// Underlying error log store.
    pub fn error_log(&self) -> &ErrorLogStore<O> {
        self.recorder.log()
    }

    // ========== Management API ==========

    /// Management API caller that records failures into this client's log.
    pub fn management_api(&self) -> ManagementApi<T, O> {
        ManagementApi::new(self.config.clone(), self.transport.clone(), self.recorder.clone())
    }
}
