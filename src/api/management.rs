//! Management API
//!
//! Thin caller for the provider's `/api/v2` endpoints. Failures are recorded
//! into the error log and surface as `None` so callers can degrade.

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, OptionStore};
use crate::error::{LoginError, NetworkError};
use crate::error_log::ErrorRecorder;
use crate::types::{ErrorInput, LoginConfig};

/// Error body returned by the management API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default)]
    pub error: Option<String>,
    pub message: String,
    #[serde(rename = "errorCode", default)]
    pub error_code: Option<String>,
}

impl ApiErrorBody {
    /// Parse a response body, if it has the provider's error shape.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    fn into_input(self) -> ErrorInput {
        let code = self
            .error_code
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.status_code.to_string());
        ErrorInput::structured(code, self.message)
    }
}

/// Percent-encode one path segment (`test|123` becomes `test%7C123`).
pub fn encode_path_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Management API caller.
pub struct ManagementApi<T: HttpTransport, O: OptionStore + ?Sized> {
    config: Arc<LoginConfig>,
    transport: Arc<T>,
    recorder: Arc<ErrorRecorder<O>>,
    base_url: String,
}

impl<T: HttpTransport, O: OptionStore + ?Sized> ManagementApi<T, O> {
    /// Create a new caller.
    pub fn new(config: Arc<LoginConfig>, transport: Arc<T>, recorder: Arc<ErrorRecorder<O>>) -> Self {
        let base_url = format!("https://{}/api/v2", config.domain_host());
        Self {
            config,
            transport,
            recorder,
            base_url,
        }
    }

    /// Point the caller at another API root (e.g. a local mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `https://{domain}/api/v2/{path}`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build a request with JSON headers and bearer token.
    pub fn request(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> HttpRequest {
        let mut headers = HashMap::new();
        headers.insert("accept".to_string(), "application/json".to_string());
        if body.is_some() {
            headers.insert("content-type".to_string(), "application/json".to_string());
        }
        if let Some(token) = &self.config.api_token {
            headers.insert(
                "authorization".to_string(),
                format!("Bearer {}", token.expose_secret()),
            );
        }

        HttpRequest {
            method,
            url: self.endpoint(path),
            headers,
            body: body.map(Value::to_string),
            timeout: Some(self.config.timeout),
        }
    }

    /// Send `request`. Returns the response on 2xx, otherwise records the
    /// failure under `section` and returns `None`.
    pub async fn call(&self, section: &str, request: HttpRequest) -> Option<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();
        let timeout = self.config.timeout;

        let result = match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(LoginError::Network(NetworkError::Timeout { timeout })),
        };

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, method = method.as_str(), url = %url, "Management API request failed");
                self.recorder.record_error(section, &e);
                return None;
            }
        };

        if response.is_success() {
            debug!(method = method.as_str(), url = %url, status = response.status, "Management API call succeeded");
            return Some(response);
        }

        warn!(
            method = method.as_str(),
            url = %url,
            status = response.status,
            "Management API returned an error"
        );
        let input = match ApiErrorBody::parse(&response.body) {
            Some(body) => body.into_input(),
            None => ErrorInput::http_response(response.status, response.status_text.clone()),
        };
        self.recorder.record_error(section, input);
        None
    }

    /// Call and decode a JSON body. An empty body decodes to `Value::Null`.
    pub async fn call_json(&self, section: &str, request: HttpRequest) -> Option<Value> {
        let response = self.call(section, request).await?;
        if response.body.trim().is_empty() {
            return Some(Value::Null);
        }
        match serde_json::from_str(&response.body) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, section, "Management API returned invalid JSON");
                self.recorder
                    .record_error(section, ErrorInput::structured("invalid_json", e.to_string()));
                None
            }
        }
    }

    /// `GET {path}`.
    pub async fn get(&self, section: &str, path: &str) -> Option<Value> {
        let request = self.request(HttpMethod::Get, path, None);
        self.call_json(section, request).await
    }

    /// `POST {path}` with a JSON body.
    pub async fn post(&self, section: &str, path: &str, body: &Value) -> Option<Value> {
        let request = self.request(HttpMethod::Post, path, Some(body));
        self.call_json(section, request).await
    }

    /// `PATCH {path}` with a JSON body.
    pub async fn patch(&self, section: &str, path: &str, body: &Value) -> Option<Value> {
        let request = self.request(HttpMethod::Patch, path, Some(body));
        self.call_json(section, request).await
    }

    /// `DELETE {path}`. Returns whether the call succeeded.
    pub async fn delete(&self, section: &str, path: &str) -> bool {
        let request = self.request(HttpMethod::Delete, path, None);
        self.call(section, request).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::LoginConfigBuilder;
    use crate::core::{InMemoryOptionStore, MockHttpTransport};
    use crate::types::UNKNOWN_CODE;
    use serde_json::json;

    fn api(
        transport: Arc<MockHttpTransport>,
    ) -> (ManagementApi<MockHttpTransport, InMemoryOptionStore>, Arc<ErrorRecorder<InMemoryOptionStore>>) {
        let config = Arc::new(
            LoginConfigBuilder::new()
                .domain("test.domain.com")
                .client_id("abc")
                .api_token("api-token")
                .build(),
        );
        let recorder = Arc::new(ErrorRecorder::new(Arc::new(InMemoryOptionStore::new())));
        (ManagementApi::new(config, transport, recorder.clone()), recorder)
    }

    #[test]
    fn test_endpoint_and_headers() {
        let (api, _) = api(Arc::new(MockHttpTransport::new()));
        let path = format!("users/{}", encode_path_segment("test|1234567890"));
        assert_eq!(
            api.endpoint(&path),
            "https://test.domain.com/api/v2/users/test%7C1234567890"
        );

        let request = api.request(HttpMethod::Patch, &path, Some(&json!({"password": "p"})));
        assert_eq!(request.method, HttpMethod::Patch);
        assert_eq!(
            request.headers.get("authorization").map(String::as_str),
            Some("Bearer api-token")
        );
        assert_eq!(
            request.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(request.body.as_deref(), Some(r#"{"password":"p"}"#));
    }

    #[tokio::test]
    async fn test_success_records_nothing() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(200, &json!({"user_id": "test|1"}));
        let (api, recorder) = api(transport.clone());

        let value = api.get("api", "users/test%7C1").await.unwrap();
        assert_eq!(value["user_id"], "test|1");
        assert!(recorder.log().get().is_empty());
        assert_eq!(
            transport.get_last_request().map(|r| r.url),
            Some("https://test.domain.com/api/v2/users/test%7C1".to_string())
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_recorded() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_error(LoginError::Network(NetworkError::ConnectionFailed {
            message: "refused".to_string(),
        }));
        let (api, recorder) = api(transport);

        assert!(!api.delete("api_delete_mfa", "guardian/enrollments/1").await);
        let log = recorder.log().get();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].section, "api_delete_mfa");
        assert_eq!(log[0].code, "AUTH0_NETWORK");
    }

    #[tokio::test]
    async fn test_api_error_body_is_recorded() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(
            400,
            &json!({
                "statusCode": 400,
                "error": "Bad Request",
                "message": "Caught an API error.",
                "errorCode": "caught_api_error"
            }),
        );
        transport.queue_json_response(
            400,
            &json!({
                "statusCode": 400,
                "error": "Bad Request",
                "message": "PasswordStrengthError: Password is too weak"
            }),
        );
        let (api, recorder) = api(transport);

        assert!(api.patch("api", "users/1", &json!({})).await.is_none());
        assert!(api.patch("api", "users/1", &json!({})).await.is_none());

        let log = recorder.log().get();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].code, "400");
        assert_eq!(log[0].message, "PasswordStrengthError: Password is too weak");
        assert_eq!(log[1].code, "caught_api_error");
    }

    #[tokio::test]
    async fn test_plain_http_error_is_recorded() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_response(HttpResponse {
            status: 503,
            status_text: "Service Unavailable".to_string(),
            headers: HashMap::new(),
            body: "<html>down</html>".to_string(),
        });
        let (api, recorder) = api(transport);

        assert!(api.get("api", "stats/daily").await.is_none());
        let log = recorder.log().get();
        assert_eq!(log[0].code, "503");
        assert_eq!(log[0].message, "Service Unavailable");
        assert_ne!(log[0].code, UNKNOWN_CODE);
    }

    #[tokio::test]
    async fn test_empty_success_body() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_response(HttpResponse {
            status: 204,
            status_text: "No Content".to_string(),
            headers: HashMap::new(),
            body: String::new(),
        });
        let (api, recorder) = api(transport);

        assert_eq!(api.post("api", "jobs", &json!({"a": 1})).await, Some(Value::Null));
        assert!(recorder.log().get().is_empty());
    }

    #[test]
    fn test_api_error_body_requires_shape() {
        assert!(ApiErrorBody::parse(r#"{"statusCode":400,"message":"m"}"#).is_some());
        assert!(ApiErrorBody::parse(r#"{"error":"x"}"#).is_none());
        assert!(ApiErrorBody::parse("not json").is_none());
    }
}
