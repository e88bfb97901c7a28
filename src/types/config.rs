//! Configuration Types
//!
//! Login configuration snapshot.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigurationError;

/// Default client name reported in the `auth0Client` telemetry parameter.
pub const DEFAULT_CLIENT_NAME: &str = "auth0-login";

/// Default management API timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30000;

/// Option keys read by [`crate::builders::LoginConfigBuilder::from_options`].
pub struct OptionKeys;

impl OptionKeys {
    pub const DOMAIN: &'static str = "domain";
    pub const CLIENT_ID: &'static str = "client_id";
    pub const IMPLICIT_WORKFLOW: &'static str = "auth0_implicit_workflow";
    pub const SITE_URL: &'static str = "site_url";
    pub const LOGIN_URL: &'static str = "login_url";
}

/// Which authorization flow the login button starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowMode {
    /// Authorization Code flow, handled by the site's callback endpoint.
    #[default]
    #[serde(rename = "code")]
    AuthorizationCode,
    /// OIDC Implicit flow, handled by the login page.
    Implicit,
}

impl FlowMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "code",
            Self::Implicit => "implicit",
        }
    }

    /// Value sent as `response_type`.
    pub fn response_type(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "code",
            Self::Implicit => "id_token",
        }
    }

    pub fn is_implicit(&self) -> bool {
        matches!(self, Self::Implicit)
    }
}

impl FromStr for FlowMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "code" | "authorization_code" => Ok(Self::AuthorizationCode),
            "implicit" | "id_token" => Ok(Self::Implicit),
            _ => Err(ConfigurationError::InvalidFlowMode {
                value: value.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for FlowMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Login configuration snapshot.
///
/// Missing values are kept as empty strings; see
/// [`crate::builders::LoginConfigBuilder::build_strict`] for the validating path.
#[derive(Clone)]
pub struct LoginConfig {
    /// Tenant domain, e.g. `tenant.auth0.com`.
    pub domain: String,
    /// Application client ID.
    pub client_id: String,
    /// Flow started by the login button.
    pub flow_mode: FlowMode,
    /// Base URL of the application site.
    pub site_url: String,
    /// Application's native login page URL.
    pub login_url: String,
    /// Name reported in `auth0Client`.
    pub client_name: String,
    /// Management API token.
    pub api_token: Option<SecretString>,
    /// Management API timeout.
    pub timeout: Duration,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            client_id: String::new(),
            flow_mode: FlowMode::default(),
            site_url: String::new(),
            login_url: String::new(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            api_token: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl std::fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginConfig")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("flow_mode", &self.flow_mode)
            .field("site_url", &self.site_url)
            .field("login_url", &self.login_url)
            .field("client_name", &self.client_name)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LoginConfig {
    /// Domain without scheme or trailing slash.
    pub fn domain_host(&self) -> &str {
        let domain = self.domain.trim();
        let domain = domain
            .strip_prefix("https://")
            .or_else(|| domain.strip_prefix("http://"))
            .unwrap_or(domain);
        domain.trim_end_matches('/')
    }

    /// Callback endpoint for the Authorization Code flow.
    pub fn code_callback_url(&self) -> String {
        format!("{}/index.php?auth0=1", self.site_url.trim_end_matches('/'))
    }

    /// Login page URL carrying the `auth0` marker for the Implicit flow.
    pub fn implicit_callback_url(&self) -> String {
        let separator = if self.login_url.contains('?') { '&' } else { '?' };
        format!("{}{}auth0=1", self.login_url, separator)
    }

    /// Redirect URI for the configured flow mode.
    pub fn redirect_uri(&self) -> String {
        match self.flow_mode {
            FlowMode::AuthorizationCode => self.code_callback_url(),
            FlowMode::Implicit => self.implicit_callback_url(),
        }
    }
}
