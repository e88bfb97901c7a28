//! Integration tests for the management API caller

use super::*;
use auth0_login::{encode_path_segment, HttpMethod, HttpRequest, HttpTransport};
use serde_json::json;
use std::collections::HashMap;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_transport_round_trip() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("x-test", "1"))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .mount(&mock_server)
        .await;

    let transport = ReqwestHttpTransport::new().expect("Failed to build transport");
    let mut headers = HashMap::new();
    headers.insert("x-test".to_string(), "1".to_string());
    let response = transport
        .send(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/echo", mock_server.uri()),
            headers,
            body: Some("{}".to_string()),
            timeout: None,
        })
        .await
        .expect("Request failed");

    assert_eq!(response.status, 201);
    assert_eq!(response.status_text, "Created");
    assert_eq!(response.body, "created");
    assert!(response.is_success());
}

#[tokio::test]
async fn test_patch_user_success() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v2/users/test%7C1234567890"))
        .and(header("authorization", "Bearer test-api-token"))
        .and(body_json(json!({"password": "strong-password"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user_id": "test|1234567890"})))
        .mount(&mock_server)
        .await;

    let client = create_client();
    let api = client
        .management_api()
        .with_base_url(format!("{}/api/v2", mock_server.uri()));

    let user_path = format!("users/{}", encode_path_segment("test|1234567890"));
    let user = api
        .patch("api_change_password", &user_path, &json!({"password": "strong-password"}))
        .await
        .expect("Call failed");

    assert_eq!(user["user_id"], "test|1234567890");
    assert!(client.get_error_log().is_empty());
}

#[tokio::test]
async fn test_failures_are_logged() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v2/guardian/enrollments/api-error"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "statusCode": 400,
            "error": "Bad Request",
            "message": "Caught an API error.",
            "errorCode": "caught_api_error"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/v2/users/weak"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "statusCode": 400,
            "error": "Bad Request",
            "message": "PasswordStrengthError: Password is too weak"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/stats/daily"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<h1>oops</h1>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v2/guardian/enrollments/ok"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = create_client();
    let api = client
        .management_api()
        .with_base_url(format!("{}/api/v2", mock_server.uri()));

    assert!(!api.delete("api_delete_mfa", "guardian/enrollments/api-error").await);
    let log = client.get_error_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].code, "caught_api_error");
    assert_eq!(log[0].section, "api_delete_mfa");

    assert!(api
        .patch("api_change_password", "users/weak", &json!({"password": "123"}))
        .await
        .is_none());
    let log = client.get_error_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].code, "400");
    assert_eq!(log[0].message, "PasswordStrengthError: Password is too weak");

    assert!(api.get("api_stats", "stats/daily").await.is_none());
    let log = client.get_error_log();
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].code, "500");
    assert_eq!(log[0].message, "Internal Server Error");

    // Success leaves the log untouched.
    assert!(api.delete("api_delete_mfa", "guardian/enrollments/ok").await);
    assert_eq!(client.get_error_log().len(), 3);
}

#[tokio::test]
async fn test_repeated_failure_is_counted() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "statusCode": 401,
            "error": "Unauthorized",
            "message": "Invalid token"
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_client();
    let api = client
        .management_api()
        .with_base_url(format!("{}/api/v2", mock_server.uri()));

    assert!(api.get("api_users", "users").await.is_none());
    assert!(api.get("api_users", "users").await.is_none());

    let log = client.get_error_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].code, "401");
    assert_eq!(log[0].count, 2);
    assert_eq!(log[0].date, 1_700_000_000);
}

#[tokio::test]
async fn test_connection_failure_is_logged() {
    let client = create_client();
    // Nothing listens on port 9 of localhost.
    let api = client.management_api().with_base_url("http://127.0.0.1:9/api/v2");

    assert!(api.get("api_users", "users").await.is_none());
    let log = client.get_error_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].code, "AUTH0_NETWORK");
}
