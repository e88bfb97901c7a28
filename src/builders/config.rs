//! Configuration Builder
//!
//! Fluent builder for the login configuration snapshot.

use secrecy::SecretString;
use serde_json::Value;
use std::time::Duration;

use crate::core::OptionStore;
use crate::error::{ConfigurationError, LoginError};
use crate::types::{FlowMode, LoginConfig, OptionKeys, DEFAULT_CLIENT_NAME, DEFAULT_TIMEOUT_MS};

/// Login configuration builder.
#[derive(Default)]
pub struct LoginConfigBuilder {
    domain: Option<String>,
    client_id: Option<String>,
    flow_mode: FlowMode,
    site_url: Option<String>,
    login_url: Option<String>,
    client_name: Option<String>,
    api_token: Option<SecretString>,
    timeout: Option<Duration>,
}

impl LoginConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder from the host's option store.
    ///
    /// Absent options stay unset; read failures are returned.
    pub fn from_options(store: &dyn OptionStore) -> Result<Self, LoginError> {
        let mut builder = Self::new();

        if let Some(domain) = read_string(store, OptionKeys::DOMAIN)? {
            builder = builder.domain(domain);
        }
        if let Some(client_id) = read_string(store, OptionKeys::CLIENT_ID)? {
            builder = builder.client_id(client_id);
        }
        if let Some(site_url) = read_string(store, OptionKeys::SITE_URL)? {
            builder = builder.site_url(site_url);
        }
        if let Some(login_url) = read_string(store, OptionKeys::LOGIN_URL)? {
            builder = builder.login_url(login_url);
        }

        let implicit = store
            .get_option(OptionKeys::IMPLICIT_WORKFLOW)?
            .map_or(false, |value| is_truthy(&value));
        Ok(builder.implicit(implicit))
    }

    /// Set tenant domain.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set flow mode.
    pub fn flow_mode(mut self, flow_mode: FlowMode) -> Self {
        self.flow_mode = flow_mode;
        self
    }

    /// Opt in to (or out of) the Implicit flow.
    pub fn implicit(self, implicit: bool) -> Self {
        self.flow_mode(if implicit {
            FlowMode::Implicit
        } else {
            FlowMode::AuthorizationCode
        })
    }

    /// Set site base URL.
    pub fn site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = Some(site_url.into());
        self
    }

    /// Set login page URL. Defaults to `{site_url}/wp-login.php`.
    pub fn login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = Some(login_url.into());
        self
    }

    /// Set the name reported in `auth0Client`.
    pub fn client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = Some(client_name.into());
        self
    }

    /// Set management API token.
    pub fn api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(SecretString::new(api_token.into()));
        self
    }

    /// Set management API timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the configuration. Missing values become empty strings.
    pub fn build(self) -> LoginConfig {
        let site_url = self.site_url.unwrap_or_default();
        let login_url = self
            .login_url
            .unwrap_or_else(|| format!("{}/wp-login.php", site_url.trim_end_matches('/')));

        LoginConfig {
            domain: self.domain.unwrap_or_default(),
            client_id: self.client_id.unwrap_or_default(),
            flow_mode: self.flow_mode,
            site_url,
            login_url,
            client_name: self
                .client_name
                .unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string()),
            api_token: self.api_token,
            timeout: self
                .timeout
                .unwrap_or_else(|| Duration::from_millis(DEFAULT_TIMEOUT_MS)),
        }
    }

    /// Build the configuration, rejecting an absent client ID or domain.
    pub fn build_strict(self) -> Result<LoginConfig, LoginError> {
        for (field, value) in [("client_id", &self.client_id), ("domain", &self.domain)] {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                return Err(LoginError::Configuration(ConfigurationError::MissingRequired {
                    field: field.to_string(),
                }));
            }
        }
        Ok(self.build())
    }
}

fn read_string(store: &dyn OptionStore, key: &str) -> Result<Option<String>, LoginError> {
    Ok(match store.get_option(key)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        _ => false,
    }
}

/// Create a new login configuration builder.
pub fn login_config() -> LoginConfigBuilder {
    LoginConfigBuilder::new()
}
