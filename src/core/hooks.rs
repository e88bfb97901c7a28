//! Hook Registry
//!
//! Typed extension points applied as an ordered fold over the initial value.
//!
//! Callbacks are registered while the registry is still owned mutably, i.e. at
//! configuration time. Once wrapped in an `Arc` and handed to the builders the
//! set of callbacks is fixed, so invocation order is the registration order.

use tracing::debug;

use crate::types::AuthorizationParameters;

/// Extension point identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookName {
    /// `(scope_list, context) -> scope_list`
    AuthScope,
    /// `(params, connection, redirect_to) -> params`
    AuthorizeUrlParams,
}

impl HookName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthScope => "auth0_auth_scope",
            Self::AuthorizeUrlParams => "auth0_authorize_url_params",
        }
    }
}

/// Scope hook callback.
pub type ScopeHook = Box<dyn Fn(Vec<String>, &str) -> Vec<String> + Send + Sync>;

/// Authorize-params hook callback.
pub type AuthorizeParamsHook = Box<
    dyn Fn(AuthorizationParameters, Option<&str>, Option<&str>) -> AuthorizationParameters
        + Send
        + Sync,
>;

/// Registry of hook callbacks.
#[derive(Default)]
pub struct HookRegistry {
    scope: Vec<ScopeHook>,
    authorize_params: Vec<AuthorizeParamsHook>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scope callback.
    pub fn on_scope<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Vec<String>, &str) -> Vec<String> + Send + Sync + 'static,
    {
        self.scope.push(Box::new(hook));
        debug!(hook = HookName::AuthScope.as_str(), "Registered hook callback");
        self
    }

    /// Register an authorize-params callback.
    pub fn on_authorize_params<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(AuthorizationParameters, Option<&str>, Option<&str>) -> AuthorizationParameters
            + Send
            + Sync
            + 'static,
    {
        self.authorize_params.push(Box::new(hook));
        debug!(
            hook = HookName::AuthorizeUrlParams.as_str(),
            "Registered hook callback"
        );
        self
    }

    /// Number of callbacks registered for a hook.
    pub fn hook_count(&self, name: HookName) -> usize {
        match name {
            HookName::AuthScope => self.scope.len(),
            HookName::AuthorizeUrlParams => self.authorize_params.len(),
        }
    }

    /// Run the scope chain.
    pub fn apply_scope(&self, scope: Vec<String>, context: &str) -> Vec<String> {
        self.scope.iter().fold(scope, |acc, hook| hook(acc, context))
    }

    /// Run the authorize-params chain.
    pub fn apply_authorize_params(
        &self,
        params: AuthorizationParameters,
        connection: Option<&str>,
        redirect_to: Option<&str>,
    ) -> AuthorizationParameters {
        self.authorize_params
            .iter()
            .fold(params, |acc, hook| hook(acc, connection, redirect_to))
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("scope", &self.scope.len())
            .field("authorize_params", &self.authorize_params.len())
            .finish()
    }
}
