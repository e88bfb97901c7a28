//! Integration tests using WireMock
//!
//! These tests drive the public client against a mock management API and
//! walk through a complete login initiation.

pub mod login_flow;
pub mod management_api;

use std::sync::Arc;

use auth0_login::{
    login_config, Auth0Login, HookRegistry, InMemoryOptionStore, ManualClock, ReqwestHttpTransport,
};
use wiremock::MockServer;

/// Helper to create a mock server.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client with a real HTTP transport and an in-memory option store.
pub fn create_client() -> Auth0Login<InMemoryOptionStore, ReqwestHttpTransport> {
    let config = login_config()
        .domain("test.domain.com")
        .client_id("abc")
        .site_url("https://example.org")
        .api_token("test-api-token")
        .build();
    let transport = ReqwestHttpTransport::new().expect("Failed to build transport");
    Auth0Login::with_components(
        config,
        HookRegistry::new(),
        Arc::new(InMemoryOptionStore::new()),
        Arc::new(transport),
        Arc::new(ManualClock::new(1_700_000_000)),
    )
}
