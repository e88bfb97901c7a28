//! Error Log Types
//!
//! Entries of the management API error log and the failure shapes fed into it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LoginError;

/// Code recorded when the failure carries none.
pub const UNKNOWN_CODE: &str = "unknown_code";

/// Message recorded when the failure carries none.
pub const UNKNOWN_MESSAGE: &str = "Unknown error message";

/// One row of the error log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    /// Portion of the codebase that produced the failure.
    pub section: String,
    pub code: String,
    pub message: String,
    /// Unix timestamp (seconds) of the most recent occurrence.
    #[serde(default)]
    pub date: i64,
    /// Number of consecutive occurrences; always at least 1.
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

impl ErrorLogEntry {
    /// First occurrence of a failure.
    pub fn new(candidate: ErrorCandidate, date: i64) -> Self {
        Self {
            section: candidate.section,
            code: candidate.code,
            message: candidate.message,
            date,
            count: 1,
        }
    }

    /// Whether this entry describes the same failure, ignoring `date` and `count`.
    pub fn matches(&self, candidate: &ErrorCandidate) -> bool {
        self.section == candidate.section
            && self.code == candidate.code
            && self.message == candidate.message
    }

    /// Register another occurrence.
    pub fn repeat(&mut self, date: i64) {
        self.date = date;
        self.count = self.count.saturating_add(1);
    }
}

/// Normalized failure before it is merged into the log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorCandidate {
    pub section: String,
    pub code: String,
    pub message: String,
}

/// A failure observed while calling the identity provider.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorInput {
    /// Error object with a machine code and message.
    Structured { code: String, message: String },
    /// Native error value.
    NativeFault {
        code: Option<String>,
        message: String,
    },
    /// Raw HTTP response shape.
    HttpResponse {
        code: Option<String>,
        message: Option<String>,
    },
    /// Anything else.
    Opaque(Value),
}

impl ErrorInput {
    /// Structured error with a machine code.
    pub fn structured(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structured {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Raw response status and reason.
    pub fn http_response(code: impl ToString, message: impl Into<String>) -> Self {
        Self::HttpResponse {
            code: Some(code.to_string()),
            message: Some(message.into()),
        }
    }

    /// Any error type; the code is left to the default.
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        Self::NativeFault {
            code: None,
            message: error.to_string(),
        }
    }

    /// Normalize into a `{section, code, message}` candidate.
    pub fn normalize(&self, section: &str) -> ErrorCandidate {
        let (code, message) = match self {
            Self::Structured { code, message } => (non_empty(code), non_empty(message)),
            Self::NativeFault { code, message } => {
                (code.as_deref().and_then(non_empty), non_empty(message))
            }
            Self::HttpResponse { code, message } => (
                code.as_deref().map(sanitize_text_field).filter(|c| !c.is_empty()),
                message.as_deref().map(sanitize_text_field).filter(|m| !m.is_empty()),
            ),
            Self::Opaque(value) => (None, opaque_message(value)),
        };

        ErrorCandidate {
            section: section.to_string(),
            code: code.unwrap_or_else(|| UNKNOWN_CODE.to_string()),
            message: message.unwrap_or_else(|| UNKNOWN_MESSAGE.to_string()),
        }
    }
}

impl From<&LoginError> for ErrorInput {
    fn from(error: &LoginError) -> Self {
        Self::NativeFault {
            code: Some(error.error_code().to_string()),
            message: error.to_string(),
        }
    }
}

impl From<LoginError> for ErrorInput {
    fn from(error: LoginError) -> Self {
        Self::from(&error)
    }
}

impl From<Value> for ErrorInput {
    fn from(value: Value) -> Self {
        Self::Opaque(value)
    }
}

impl From<&str> for ErrorInput {
    fn from(message: &str) -> Self {
        Self::Opaque(Value::String(message.to_string()))
    }
}

impl From<String> for ErrorInput {
    fn from(message: String) -> Self {
        Self::Opaque(Value::String(message))
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn opaque_message(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).ok(),
    }
}

/// Strip markup and collapse whitespace, as done for text pulled out of a response.
pub fn sanitize_text_field(input: &str) -> String {
    let mut text = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            _ => text.push(c),
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NetworkError, StorageError};
    use serde_json::json;

    #[test]
    fn test_structured_normalization() {
        let candidate = ErrorInput::structured("caught_api_error", "Bad thing").normalize("api");
        assert_eq!(candidate.section, "api");
        assert_eq!(candidate.code, "caught_api_error");
        assert_eq!(candidate.message, "Bad thing");
    }

    #[test]
    fn test_native_fault_from_login_error() {
        let error = LoginError::Network(NetworkError::ConnectionFailed {
            message: "refused".to_string(),
        });
        let candidate = ErrorInput::from(&error).normalize("api");
        assert_eq!(candidate.code, "AUTH0_NETWORK");
        assert_eq!(candidate.message, "Network error: Connection failed: refused");
    }

    #[test]
    fn test_native_fault_from_any_error() {
        let error = StorageError::WriteFailed {
            message: "disk full".to_string(),
        };
        let candidate = ErrorInput::from_error(&error).normalize("store");
        assert_eq!(candidate.code, UNKNOWN_CODE);
        assert_eq!(candidate.message, "Write failed: disk full");
    }

    #[test]
    fn test_http_response_normalization() {
        let candidate = ErrorInput::http_response(400, "  <b>Bad</b>\n Request ").normalize("api");
        assert_eq!(candidate.code, "400");
        assert_eq!(candidate.message, "Bad Request");

        let candidate = ErrorInput::HttpResponse {
            code: Some(String::new()),
            message: None,
        }
        .normalize("api");
        assert_eq!(candidate.code, UNKNOWN_CODE);
        assert_eq!(candidate.message, UNKNOWN_MESSAGE);
    }

    #[test]
    fn test_opaque_normalization() {
        let candidate = ErrorInput::from("Caught WP_Error.").normalize("api");
        assert_eq!(candidate.code, UNKNOWN_CODE);
        assert_eq!(candidate.message, "Caught WP_Error.");

        let candidate = ErrorInput::from(json!(42)).normalize("api");
        assert_eq!(candidate.message, "42");

        let candidate = ErrorInput::from(json!({"a": [true, null], "b": 1})).normalize("api");
        assert_eq!(candidate.message, r#"{"a":[true,null],"b":1}"#);

        let candidate = ErrorInput::from("").normalize("api");
        assert_eq!(candidate.code, UNKNOWN_CODE);
        assert_eq!(candidate.message, "");

        let candidate = ErrorInput::from(Value::Null).normalize("api");
        assert_eq!(candidate.message, UNKNOWN_MESSAGE);
    }

    #[test]
    fn test_entry_defaults_when_deserializing() {
        let entry: ErrorLogEntry =
            serde_json::from_str(r#"{"section":"s","code":"c","message":"m"}"#).unwrap();
        assert_eq!(entry.count, 1);
        assert_eq!(entry.date, 0);
    }

    #[test]
    fn test_entry_matches_ignores_date_and_count() {
        let candidate = ErrorInput::structured("c", "m").normalize("s");
        let mut entry = ErrorLogEntry::new(candidate.clone(), 100);
        entry.repeat(200);
        assert!(entry.matches(&candidate));
        assert_eq!(entry.count, 2);
        assert_eq!(entry.date, 200);

        let other = ErrorInput::structured("c", "m").normalize("other");
        assert!(!entry.matches(&other));
    }

    #[test]
    fn test_sanitize_text_field() {
        assert_eq!(sanitize_text_field("a\t\tb  c"), "a b c");
        assert_eq!(sanitize_text_field("<script>x</script>y"), "xy");
    }
}
