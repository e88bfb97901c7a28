//! End-to-end login initiation

use super::*;
use auth0_login::{
    FileOptionStore, FlowMode, InMemorySession, OptionStore, SessionStore, NONCE_SESSION_KEY,
    STATE_SESSION_KEY,
};
use serde_json::json;

#[test]
fn test_code_flow_end_to_end() {
    let client = create_client();
    let session = Arc::new(InMemorySession::new());

    let params = client.build_authorize_params(session.clone(), Some("my-connection"), None);
    assert_eq!(params.get("response_type"), Some("code"));
    assert_eq!(params.get("connection"), Some("my-connection"));
    assert_eq!(params.get("scope"), Some("openid email profile"));
    assert_eq!(params.get("client_id"), Some("abc"));
    assert_eq!(
        params.get("redirect_uri"),
        Some("https://example.org/index.php?auth0=1")
    );

    let state = params.get("state").unwrap_or_default();
    assert!(!state.is_empty());
    assert_eq!(session.get_session_value(STATE_SESSION_KEY).as_deref(), Some(state));
    assert!(session.get_session_value(NONCE_SESSION_KEY).is_none());

    // A second attempt replaces the pending state.
    let again = client.build_authorize_params(session.clone(), Some("my-connection"), None);
    assert_ne!(again.get("state"), Some(state));
    assert_eq!(
        session.get_session_value(STATE_SESSION_KEY).as_deref(),
        again.get("state")
    );
}

#[test]
fn test_implicit_flow_from_file_options() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let options = Arc::new(FileOptionStore::new(dir.path().join("options.json")));
    options.set_option("domain", json!("test.domain.com")).unwrap();
    options.set_option("client_id", json!("abc")).unwrap();
    options.set_option("site_url", json!("https://example.org")).unwrap();
    options.set_option("auth0_implicit_workflow", json!("1")).unwrap();

    let mut hooks = HookRegistry::new();
    hooks.on_scope(|mut scope, _| {
        scope.push("offline_access".to_string());
        scope
    });
    hooks.on_authorize_params(|mut params, connection, redirect_to| {
        if let (Some(connection), Some(redirect_to)) = (connection, redirect_to) {
            params.insert(connection, redirect_to);
        }
        params
    });

    let client = Auth0Login::from_options(options.clone(), hooks).expect("Failed to build client");
    assert_eq!(client.config().flow_mode, FlowMode::Implicit);

    let session = Arc::new(InMemorySession::new());
    let url = client
        .build_authorize_url(session.clone(), Some("auth0"), Some("https://auth0.com"))
        .expect("Failed to build URL");

    assert_eq!(url.host_str(), Some("test.domain.com"));
    let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let value = |key: &str| {
        query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };
    assert_eq!(value("response_type").as_deref(), Some("id_token"));
    assert_eq!(
        value("scope").as_deref(),
        Some("openid email profile offline_access")
    );
    assert_eq!(
        value("redirect_uri").as_deref(),
        Some("https://example.org/wp-login.php?auth0=1")
    );
    assert_eq!(value("auth0").as_deref(), Some("https://auth0.com"));
    assert_eq!(value("nonce"), session.get_session_value(NONCE_SESSION_KEY));

    // Errors recorded by this client persist to the same file.
    assert!(client.record_error("login", "Caught WP_Error."));
    let reopened = FileOptionStore::new(dir.path().join("options.json"));
    let stored = reopened.get_option("auth0_error_log").unwrap().unwrap();
    assert_eq!(stored[0]["message"], "Caught WP_Error.");
    assert_eq!(stored[0]["count"], 1);
}

#[test]
fn test_state_is_single_use() {
    let client = create_client();
    let session = Arc::new(InMemorySession::new());
    let request = client.authorize_request(session);

    let params = request.build_authorize_params(None, None);
    let state = params.get("state").unwrap_or_default().to_string();

    assert!(!request.states().consume_csrf_state("forged"));
    // The forged attempt consumed the pending state.
    assert!(!request.states().consume_csrf_state(&state));
}
