//! Authorization Types
//!
//! Parameter set sent to the provider's `/authorize` endpoint.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Well-known authorization parameter names.
pub struct ParamNames;

impl ParamNames {
    pub const SCOPE: &'static str = "scope";
    pub const RESPONSE_TYPE: &'static str = "response_type";
    pub const REDIRECT_URI: &'static str = "redirect_uri";
    pub const CLIENT_ID: &'static str = "client_id";
    pub const CLIENT_TELEMETRY: &'static str = "auth0Client";
    pub const STATE: &'static str = "state";
    pub const NONCE: &'static str = "nonce";
    pub const CONNECTION: &'static str = "connection";
}

/// Insertion-ordered authorization parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorizationParameters(IndexMap<String, String>);

impl AuthorizationParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a parameter. Overwriting keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Remove a parameter, preserving the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> IndexMap<String, String> {
        self.0
    }
}

impl From<IndexMap<String, String>> for AuthorizationParameters {
    fn from(map: IndexMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AuthorizationParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for AuthorizationParameters {
    type Item = (String, String);
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
