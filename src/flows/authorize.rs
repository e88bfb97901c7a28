//! Authorization Request
//!
//! Builds the parameter set for the provider's `/authorize` endpoint.

use base64::Engine;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::core::{HookRegistry, ScopeResolver, SessionStore, StateNonceGenerator, TokenSource};
use crate::error::{ConfigurationError, LoginError};
use crate::types::{AuthorizationParameters, LoginConfig, ParamNames};

/// Context passed to the scope hook when building a login request.
pub const AUTH_SCOPE_CONTEXT: &str = "auth0";

/// Builds authorization requests for one browser session.
pub struct AuthorizationRequestBuilder<S: SessionStore> {
    config: Arc<LoginConfig>,
    hooks: Arc<HookRegistry>,
    scopes: ScopeResolver,
    states: StateNonceGenerator<S>,
}

impl<S: SessionStore> AuthorizationRequestBuilder<S> {
    /// Create a builder bound to `session`.
    pub fn new(config: Arc<LoginConfig>, hooks: Arc<HookRegistry>, session: Arc<S>) -> Self {
        let states = StateNonceGenerator::new(session);
        Self::with_generator(config, hooks, states)
    }

    /// Create a builder with a custom token source.
    pub fn with_token_source(
        config: Arc<LoginConfig>,
        hooks: Arc<HookRegistry>,
        session: Arc<S>,
        source: Arc<dyn TokenSource>,
    ) -> Self {
        let states = StateNonceGenerator::with_source(session, source);
        Self::with_generator(config, hooks, states)
    }

    fn with_generator(
        config: Arc<LoginConfig>,
        hooks: Arc<HookRegistry>,
        states: StateNonceGenerator<S>,
    ) -> Self {
        Self {
            scopes: ScopeResolver::new(hooks.clone()),
            config,
            hooks,
            states,
        }
    }

    /// State/nonce generator bound to this builder's session.
    pub fn states(&self) -> &StateNonceGenerator<S> {
        &self.states
    }

    /// Build the `/authorize` parameters.
    ///
    /// Never fails: an unset client ID is sent as an empty value. Hooks run
    /// last and may change any key, including `state` and `response_type`.
    pub fn build_authorize_params(
        &self,
        connection: Option<&str>,
        redirect_to: Option<&str>,
    ) -> AuthorizationParameters {
        let flow_mode = self.config.flow_mode;
        let mut params = AuthorizationParameters::new();

        params.insert(
            ParamNames::SCOPE,
            self.scopes.resolve_scope_string(Some(AUTH_SCOPE_CONTEXT)),
        );
        params.insert(ParamNames::RESPONSE_TYPE, flow_mode.response_type());
        params.insert(ParamNames::REDIRECT_URI, self.config.redirect_uri());
        params.insert(ParamNames::CLIENT_ID, self.config.client_id.clone());
        params.insert(ParamNames::CLIENT_TELEMETRY, self.client_telemetry());
        params.insert(ParamNames::STATE, self.states.new_csrf_state());

        if flow_mode.is_implicit() {
            params.insert(ParamNames::NONCE, self.states.new_nonce());
        }

        if let Some(connection) = connection {
            params.insert(ParamNames::CONNECTION, connection);
        }

        let params = self
            .hooks
            .apply_authorize_params(params, connection, redirect_to);

        debug!(
            flow_mode = %flow_mode,
            connection = connection.unwrap_or(""),
            params = params.len(),
            "Built authorization request"
        );

        params
    }

    /// Build the full `https://{domain}/authorize?...` URL.
    pub fn build_authorize_url(
        &self,
        connection: Option<&str>,
        redirect_to: Option<&str>,
    ) -> Result<Url, LoginError> {
        let invalid_domain = || {
            LoginError::Configuration(ConfigurationError::InvalidDomain {
                domain: self.config.domain.clone(),
            })
        };

        let domain = self.config.domain_host();
        if domain.is_empty() || domain.contains(&['/', '?', '#'][..]) {
            return Err(invalid_domain());
        }
        let mut url =
            Url::parse(&format!("https://{}/authorize", domain)).map_err(|_| invalid_domain())?;

        let params = self.build_authorize_params(connection, redirect_to);
        url.query_pairs_mut().extend_pairs(params.iter());
        Ok(url)
    }

    /// `auth0Client` value: base64 of `{"name", "version"}`.
    fn client_telemetry(&self) -> String {
        let telemetry = serde_json::json!({
            "name": self.config.client_name,
            "version": env!("CARGO_PKG_VERSION"),
        });
        base64::engine::general_purpose::STANDARD.encode(telemetry.to_string())
    }
}
