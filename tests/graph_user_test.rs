//! Graph user operations against a mocked Graph API (WireMock)

mod common;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use common::{create_test_client, create_test_config, graph_user, mount_token, odata_error, TOKEN_PATH};
use futures::{StreamExt, TryStreamExt};
use msgraph_directory::domain::{AttributeState, User, UserQuery};
use msgraph_directory::service::UserManager;
use msgraph_directory::{DirectoryError, GraphClient};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

#[tokio::test]
async fn test_connect_fails_on_rejected_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "AADSTS7000215: Invalid client secret provided."
        })))
        .mount(&mock_server)
        .await;

    let result = GraphClient::connect(create_test_config(&mock_server.uri())).await;

    match result {
        Err(DirectoryError::Authentication(message)) => {
            assert!(message.contains("401"));
            assert!(message.contains("invalid_client"));
        }
        Err(other) => panic!("expected authentication error, got {:?}", other),
        Ok(_) => panic!("expected authentication error"),
    }
}

#[tokio::test]
async fn test_connect_fails_when_token_endpoint_unreachable() {
    // Nothing listens on port 9 of localhost
    let config = create_test_config("http://127.0.0.1:9");
    let result = GraphClient::connect(config).await;
    assert!(matches!(result, Err(DirectoryError::Authentication(_))));
}

#[tokio::test]
async fn test_token_is_cached_between_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "mock-token",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/u1"))
        .and(header("authorization", "Bearer mock-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(graph_user("u1", "a@example.com", "A")))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    assert!(client.get_user("u1").await.unwrap().is_some());
    assert!(client.get_user("u1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_get_user_success() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    let attributes = STANDARD.encode(r#"{"Citizenship":"US","Sponsor":"jane@example.com"}"#);

    Mock::given(method("GET"))
        .and(path("/v1.0/users/a.b@example.com"))
        .and(query_param(
            "$select",
            "id,accountEnabled,businessPhones,displayName,givenName,surname,jobTitle,mail,\
             mobilePhone,officeLocation,userPrincipalName,assignedLicenses,companyName,\
             department,streetAddress",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "0f2c6d38-1111-2222-3333-444455556666",
            "userPrincipalName": "a.b@example.com",
            "displayName": "A B",
            "givenName": "A",
            "surname": "B",
            "mail": "a.b@example.com",
            "businessPhones": ["+1 937-555-0100"],
            "mobilePhone": null,
            "companyName": "Example Corp",
            "accountEnabled": false,
            "streetAddress": attributes
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    let user = client.get_user("a.b@example.com").await.unwrap().unwrap();
    assert_eq!(user.id, "0f2c6d38-1111-2222-3333-444455556666");
    assert_eq!(user.upn, "a.b@example.com");
    assert_eq!(user.display_name, "A B");
    assert_eq!(user.office_phone, "+1 937-555-0100");
    assert_eq!(user.mobile_phone, "");
    assert_eq!(user.company, "Example Corp");
    assert!(!user.enabled);

    let attrs = user.custom_attributes().unwrap().unwrap();
    assert_eq!(attrs.citizenship, "US");
    assert_eq!(attrs.sponsor, "jane@example.com");
}

#[tokio::test]
async fn test_get_user_not_found_returns_none() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/missing@example.com"))
        .respond_with(odata_error(
            404,
            "Request_ResourceNotFound",
            "Resource 'missing@example.com' does not exist or one of its queried reference-property objects are not present.",
        ))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    let result = client.get_user("missing@example.com").await;
    assert!(result.unwrap().is_none());
}

#[tokio::test]
async fn test_get_user_other_failure_is_request_error() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/u1"))
        .respond_with(odata_error(403, "Authorization_RequestDenied", "Insufficient privileges"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    match client.get_user("u1").await {
        Err(DirectoryError::Request {
            status,
            code,
            message,
        }) => {
            assert_eq!(status, 403);
            assert_eq!(code, "Authorization_RequestDenied");
            assert_eq!(message, "Insufficient privileges");
        }
        other => panic!("expected request error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_user_malformed_attributes_keep_record() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "userPrincipalName": "a@example.com",
            "displayName": "A",
            "accountEnabled": true,
            "streetAddress": "221B Baker Street"
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    let user = client.get_user("u1").await.unwrap().unwrap();
    assert_eq!(user.upn, "a@example.com");
    assert!(user.enabled);
    assert!(matches!(user.attributes, AttributeState::Malformed(ref e) if e.raw == "221B Baker Street"));
    assert!(matches!(user.custom_attributes(), Err(DirectoryError::Decode(_))));
}

#[tokio::test]
async fn test_list_users_follows_next_link() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    let next_link = format!("{}/v1.0/users?$skiptoken=page2", mock_server.uri());

    // More specific page first
    Mock::given(method("GET"))
        .and(path("/v1.0/users"))
        .and(query_param("$skiptoken", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [graph_user("u3", "c@example.com", "C")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                graph_user("u1", "a@example.com", "A"),
                graph_user("u2", "b@example.com", "B")
            ],
            "@odata.nextLink": next_link
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = UserManager::new(Arc::new(create_test_client(&mock_server.uri())));

    let users: Vec<User> = manager.list_users(UserQuery::all()).try_collect().await.unwrap();
    let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["u1", "u2", "u3"]);
}

#[tokio::test]
async fn test_filtered_list_is_an_advanced_query() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users"))
        .and(query_param("$filter", "accountEnabled eq false"))
        .and(query_param("$count", "true"))
        .and(header("ConsistencyLevel", "eventual"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [graph_user("u9", "z@example.com", "Z")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    let page = client
        .list_users_page(&UserQuery::filtered("accountEnabled eq false"), None)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert!(page.next.is_none());
}

#[tokio::test]
async fn test_foreign_next_link_is_rejected() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [graph_user("u1", "a@example.com", "A")],
            "@odata.nextLink": "https://graph.attacker.example/v1.0/users?$skiptoken=x"
        })))
        .mount(&mock_server)
        .await;

    let manager = UserManager::new(Arc::new(create_test_client(&mock_server.uri())));

    let results: Vec<_> = manager.list_users(UserQuery::all()).collect().await;
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(DirectoryError::Validation(_))));
}

#[tokio::test]
async fn test_find_user_by_email() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users"))
        .and(query_param("$filter", "mail eq 'o''brien@example.com'"))
        .and(header("ConsistencyLevel", "eventual"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [graph_user("u7", "obrien@example.com", "Pat O'Brien")]
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    let user = client
        .find_user_by_email("o'brien@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.id, "u7");
}

#[tokio::test]
async fn test_create_user_starts_disabled() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/v1.0/users"))
        .and(body_partial_json(json!({
            "userPrincipalName": "a.b@example.com",
            "displayName": "A B",
            "mailNickname": "a.b",
            "accountEnabled": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "new-id",
            "userPrincipalName": "a.b@example.com",
            "displayName": "A B",
            "accountEnabled": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    let created = client
        .create_user(&User::new("a.b@example.com", "A B"))
        .await
        .unwrap();
    assert_eq!(created.id, "new-id");
    assert!(!created.enabled);
}

#[tokio::test]
async fn test_enable_and_disable_patch_only_account_enabled() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("PATCH"))
        .and(path("/v1.0/users/u1"))
        .and(body_json(json!({ "accountEnabled": true })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/v1.0/users/u1"))
        .and(body_json(json!({ "accountEnabled": false })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    client.enable_user("u1").await.unwrap();
    client.disable_user("u1").await.unwrap();
}

#[tokio::test]
async fn test_update_user_leaves_account_enabled_alone() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("PATCH"))
        .and(path("/v1.0/users/u1"))
        .and(body_partial_json(json!({ "jobTitle": "Lead" })))
        .and(|request: &Request| {
            serde_json::from_slice::<serde_json::Value>(&request.body)
                .map(|body| body.get("accountEnabled").is_none() && body.get("id").is_none())
                .unwrap_or(false)
        })
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    let mut user = User::new("a@example.com", "A");
    user.id = "u1".to_string();
    user.job_title = "Lead".to_string();
    user.enabled = true;

    client.update_user(&user).await.unwrap();
}

#[tokio::test]
async fn test_update_user_requires_id() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server.uri());

    let result = client.update_user(&User::new("a@example.com", "A")).await;
    assert!(matches!(result, Err(DirectoryError::Validation(_))));
}

#[tokio::test]
async fn test_delete_missing_user_is_an_error() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("DELETE"))
        .and(path("/v1.0/users/gone"))
        .respond_with(odata_error(404, "Request_ResourceNotFound", "Resource 'gone' does not exist"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    let err = client.delete_user("gone").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.code(), Some("Request_ResourceNotFound"));
}

#[tokio::test]
async fn test_user_groups_skip_other_directory_objects() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/u1/memberOf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"@odata.type": "#microsoft.graph.group", "id": "g1", "displayName": "Engineering"},
                {"@odata.type": "#microsoft.graph.directoryRole", "id": "r1", "displayName": "Global Reader"}
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    let page = client.list_user_groups_page("u1", None).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, "g1");
    assert_eq!(page.items[0].name, "Engineering");
}

async fn mount_authorization_info(mock_server: &MockServer, ids: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v1.0/users/u1"))
        .and(query_param("$select", "authorizationInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "authorizationInfo": { "certificateUserIds": ids }
        })))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_certificate_mfa_appends_prefixed_id() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;
    mount_authorization_info(&mock_server, json!(["X509:<PN>old@example.com"])).await;

    Mock::given(method("PATCH"))
        .and(path("/v1.0/users/u1"))
        .and(body_json(json!({
            "authorizationInfo": {
                "certificateUserIds": ["X509:<PN>old@example.com", "X509:<PN>new@example.com"]
            }
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = UserManager::new(Arc::new(create_test_client(&mock_server.uri())));

    manager
        .associate_certificate_mfa("u1", "new@example.com", false)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_certificate_mfa_replace_drops_existing_ids() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;
    mount_authorization_info(
        &mock_server,
        json!(["X509:<PN>old@example.com", "X509:<PN>other@example.com"]),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/v1.0/users/u1"))
        .and(body_json(json!({
            "authorizationInfo": { "certificateUserIds": ["X509:<PN>new@example.com"] }
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    client
        .associate_certificate_mfa("u1", "X509:<PN>new@example.com", true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_certificate_mfa_already_bound_sends_no_patch() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;
    mount_authorization_info(&mock_server, json!(["X509:<PN>old@example.com"])).await;

    Mock::given(method("PATCH"))
        .and(path("/v1.0/users/u1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    client
        .associate_certificate_mfa("u1", "old@example.com", false)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_certificate_mfa_without_existing_info() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/v1.0/users/u1"))
        .and(body_json(json!({
            "authorizationInfo": { "certificateUserIds": ["X509:<PN>new@example.com"] }
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    client
        .associate_certificate_mfa("u1", "new@example.com", false)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_certificate_mfa_requires_cert_id() {
    let mock_server = MockServer::start().await;

    let client = create_test_client(&mock_server.uri());

    let result = client.associate_certificate_mfa("u1", "  ", false).await;
    assert!(matches!(result, Err(DirectoryError::Validation(_))));
}

#[tokio::test]
async fn test_sparse_update_sends_only_populated_fields() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("PATCH"))
        .and(path("/v1.0/users/u1"))
        .and(body_json(json!({ "jobTitle": "Lead" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());

    let user = User {
        id: "u1".to_string(),
        job_title: "Lead".to_string(),
        ..Default::default()
    };
    client.update_user(&user).await.unwrap();
}
