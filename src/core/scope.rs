//! Scope Resolution
//!
//! Default OIDC scopes plus the `auth0_auth_scope` extension point.

use std::sync::Arc;

use crate::core::hooks::HookRegistry;

/// Scopes requested on every login, in order.
pub const DEFAULT_SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// Computes the scope list for an authorization request.
#[derive(Clone, Debug)]
pub struct ScopeResolver {
    hooks: Arc<HookRegistry>,
}

impl ScopeResolver {
    pub fn new(hooks: Arc<HookRegistry>) -> Self {
        Self { hooks }
    }

    /// Resolve the scope list. Hooks only run when a context is supplied.
    pub fn resolve_scope(&self, context: Option<&str>) -> Vec<String> {
        let scope: Vec<String> = DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect();
        match context {
            Some(context) => self.hooks.apply_scope(scope, context),
            None => scope,
        }
    }

    /// Resolve the scope list as a space-separated wire value.
    pub fn resolve_scope_string(&self, context: Option<&str>) -> String {
        self.resolve_scope(context).join(" ")
    }
}
