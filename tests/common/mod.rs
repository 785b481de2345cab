//! Common test utilities

#![allow(dead_code)]

use msgraph_directory::config::GraphConfig;
use msgraph_directory::GraphClient;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT_ID: &str = "test-tenant";
pub const TOKEN_PATH: &str = "/test-tenant/oauth2/v2.0/token";

/// Config pointing both the token authority and Graph at the mock server
pub fn create_test_config(base_url: &str) -> GraphConfig {
    GraphConfig::new(TENANT_ID, "test-client", "test-secret").with_endpoints(base_url, base_url)
}

pub fn create_test_client(base_url: &str) -> GraphClient {
    GraphClient::new(create_test_config(base_url)).unwrap()
}

/// Mock the client-credentials token endpoint
pub async fn mount_token(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "mock-token",
            "expires_in": 3599
        })))
        .mount(mock_server)
        .await;
}

/// Graph error envelope
pub fn odata_error(status: u16, code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "error": { "code": code, "message": message }
    }))
}

pub fn graph_user(id: &str, upn: &str, display_name: &str) -> serde_json::Value {
    json!({
        "@odata.type": "#microsoft.graph.user",
        "id": id,
        "userPrincipalName": upn,
        "displayName": display_name,
        "accountEnabled": true
    })
}
