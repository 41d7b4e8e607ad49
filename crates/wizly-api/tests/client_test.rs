#![allow(clippy::unwrap_used)]
// Integration tests for `WizarrClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wizly_api::{Endpoint, Error, ErrorKind, TransportConfig, WizarrClient};

// ── Helpers ─────────────────────────────────────────────────────────

const KEY: &str = "wz-test-key";

async fn setup() -> (MockServer, WizarrClient) {
    let server = MockServer::start().await;
    let client = WizarrClient::from_api_key(
        &server.uri(),
        &SecretString::from(KEY.to_owned()),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_status_sends_api_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .and(header("X-API-Key", KEY))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "2025.6.1",
            "users": 4,
            "invites": 7,
            "pending": 2,
            "expired": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client.get_status().await.unwrap();
    assert_eq!(status["version"], "2025.6.1");
    assert_eq!(status["pending"], 2);
}

#[tokio::test]
async fn test_fetch_every_endpoint_path() {
    let (server, client) = setup().await;

    for endpoint in Endpoint::ALL {
        Mock::given(method("GET"))
            .and(path(format!("/api{}", endpoint.path())))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "endpoint": endpoint.name() })),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    for endpoint in Endpoint::ALL {
        let value = client.fetch(endpoint).await.unwrap();
        assert_eq!(value["endpoint"], endpoint.name());
    }
}

#[tokio::test]
async fn test_response_field_order_is_preserved() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"total": 1, "users": [{"id": 1}], "count": 1}"#),
        )
        .mount(&server)
        .await;

    let value = client.get_users().await.unwrap();
    let keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["total", "users", "count"]);
}

#[tokio::test]
async fn test_base_url_with_trailing_slash_and_sub_path() {
    let server = MockServer::start().await;
    let client = WizarrClient::from_reqwest(
        &format!("{}/wizarr/", server.uri()),
        reqwest::Client::new(),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/wizarr/api/api-keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let keys = client.get_api_keys().await.unwrap();
    assert_eq!(keys, json!([]));
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_invitation_accepts_201() {
    let (server, client) = setup().await;

    let payload = json!({ "server_ids": [1], "expires_in_days": 7, "unlimited": true });

    Mock::given(method("POST"))
        .and(path("/api/invitations"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "invitation": { "id": 12, "code": "ABC123", "url": "http://wizarr.local/j/ABC123" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client.create_invitation(&payload).await.unwrap();
    assert_eq!(created["invitation"]["code"], "ABC123");
}

#[tokio::test]
async fn test_delete_invitation_with_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/invitations/12"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let value = client.delete_invitation("12").await.unwrap();
    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn test_delete_user_path() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "deleted" })))
        .expect(1)
        .mount(&server)
        .await;

    let value = client.delete_user("5").await.unwrap();
    assert_eq!(value["message"], "deleted");
}

#[tokio::test]
async fn test_id_cannot_escape_its_collection() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.delete_invitation("../users/5").await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/api/invitations/..%2Fusers%2F5");
}

#[tokio::test]
async fn test_dot_segment_id_is_rejected_before_sending() {
    let (server, client) = setup().await;

    let err = client.delete_user("..").await.unwrap_err();
    assert!(matches!(err, Error::InvalidId { .. }));
    let err = client.extend_user(".", &json!({ "days": 1 })).await.unwrap_err();
    assert!(matches!(err, Error::InvalidId { .. }));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_extend_user_posts_body() {
    let (server, client) = setup().await;

    let body = json!({ "days": 30 });
    Mock::given(method("POST"))
        .and(path("/api/users/5/extend"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "expires": "2026-12-01" })))
        .expect(1)
        .mount(&server)
        .await;

    let value = client.extend_user("5", &body).await.unwrap();
    assert_eq!(value["expires"], "2026-12-01");
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_auth() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = client.get_status().await.unwrap_err();
    assert!(err.is_auth(), "expected Auth, got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn test_server_error_keeps_status_and_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/libraries"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database locked"))
        .mount(&server)
        .await;

    let err = client.get_libraries().await.unwrap_err();
    match err {
        Error::Request { status, ref body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "database locked");
        }
        other => panic!("expected Request error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_success_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client.get_servers().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Other);
}

#[tokio::test]
async fn test_connection_refused_is_connectivity() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let transport = TransportConfig {
        timeout: Duration::from_secs(2),
        ..TransportConfig::default()
    };
    let client =
        WizarrClient::from_api_key(&uri, &SecretString::from(KEY.to_owned()), &transport).unwrap();

    let err = client.get_invitations().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connectivity, "got {err:?}");
    assert!(err.is_transient());
}
