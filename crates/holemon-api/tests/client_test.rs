#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` and `SessionManager` using wiremock.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use holemon_api::{
    ApiClient, AuthRetryPolicy, Credentials, DecodeError, Error, ReqwestTransport, SessionState,
};

// ── Helpers ─────────────────────────────────────────────────────────

const API_KEY: &str = "correct horse battery staple";

fn credentials(port: u16) -> Credentials {
    Credentials::new("127.0.0.1", port, SecretString::from(API_KEY.to_owned())).unwrap()
}

async fn setup() -> (MockServer, ApiClient<ReqwestTransport>) {
    let server = MockServer::start().await;
    let client = ApiClient::with_transport(
        ReqwestTransport::with_client(reqwest::Client::new()),
        credentials(server.address().port()),
    );
    (server, client)
}

fn auth_ok(sid: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "session": { "valid": true, "totp": false, "sid": sid, "validity": 1800 }
    }))
}

/// Login that hands out `sid` for the first login only.
async fn mount_auth_once(server: &MockServer, sid: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .and(body_json(json!({ "password": API_KEY })))
        .respond_with(auth_ok(sid))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

async fn mount_auth(server: &MockServer, sid: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .and(body_json(json!({ "password": API_KEY })))
        .respond_with(auth_ok(sid))
        .mount(server)
        .await;
}

// ── Session tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_acquire_logs_in_once_and_caches() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(auth_ok("XYZ"))
        .expect(1)
        .mount(&server)
        .await;

    let session = client.session();
    assert_eq!(session.state(), SessionState::Unauthenticated);
    assert_eq!(session.acquire().await.unwrap(), "XYZ");
    assert_eq!(session.acquire().await.unwrap(), "XYZ");
    assert_eq!(session.state(), SessionState::Authenticated);
    assert_eq!(session.login_count(), 1);
}

#[tokio::test]
async fn test_login_rejected_leaves_cache_empty() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "key": "unauthorized", "message": "Unauthorized" }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let session = client.session();
    let err = assert_err!(session.acquire().await);
    assert!(matches!(err, Error::Auth { .. }), "got {err:?}");
    assert_eq!(session.state(), SessionState::Unauthenticated);

    // Nothing cached: the next acquire logs in again.
    assert_err!(session.acquire().await);
    assert_eq!(session.login_count(), 2);
}

#[tokio::test]
async fn test_login_without_sid_is_auth_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "session": { "valid": false, "sid": null } })),
        )
        .mount(&server)
        .await;

    let result = client.session().acquire().await;
    match result {
        Err(Error::Auth { ref message }) => {
            assert!(message.contains("session id"), "unexpected message: {message}");
        }
        other => panic!("expected Auth error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_logout_deletes_session() {
    let (server, client) = setup().await;
    mount_auth(&server, "XYZ").await;

    Mock::given(method("DELETE"))
        .and(path("/api/auth"))
        .and(query_param("sid", "XYZ"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.session().acquire().await.unwrap();
    assert_ok!(client.session().logout().await);
    assert_eq!(client.session().state(), SessionState::Unauthenticated);

    // Already logged out: no second DELETE.
    assert_ok!(client.session().logout().await);
}

// ── Executor tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_execute_appends_sid() {
    let (server, client) = setup().await;
    mount_auth(&server, "XYZ").await;

    Mock::given(method("GET"))
        .and(path("/api/stats/top_clients"))
        .and(query_param("blocked", "true"))
        .and(query_param("count", "3"))
        .and(query_param("sid", "XYZ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "clients": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let doc = client
        .execute("/api/stats/top_clients?blocked=true&count=3", &[])
        .await
        .unwrap();
    assert_eq!(doc, json!({ "clients": [] }));
}

#[tokio::test]
async fn test_execute_reauthenticates_after_401() {
    let (server, client) = setup().await;
    mount_auth_once(&server, "OLD").await;
    mount_auth(&server, "NEW").await;

    Mock::given(method("GET"))
        .and(path("/api/info/login"))
        .and(query_param("sid", "OLD"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/info/login"))
        .and(query_param("sid", "NEW"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dns": true })))
        .expect(1)
        .mount(&server)
        .await;

    let doc = client.execute("/api/info/login", &[]).await.unwrap();
    assert_eq!(doc["dns"], true);
    assert_eq!(client.session().login_count(), 2);
    assert_eq!(client.attempt_count(), 2);
    assert_eq!(client.session().state(), SessionState::Authenticated);
}

#[tokio::test]
async fn test_execute_succeeds_on_third_attempt() {
    let (server, client) = setup().await;
    mount_auth(&server, "XYZ").await;

    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "history": [] })))
        .expect(1)
        .mount(&server)
        .await;

    client.execute("/api/history", &[]).await.unwrap();
    assert_eq!(client.session().login_count(), 3);
}

#[tokio::test]
async fn test_execute_exhausts_after_three_auth_failures() {
    let (server, client) = setup().await;
    mount_auth(&server, "XYZ").await;

    Mock::given(method("GET"))
        .and(path("/api/stats/summary"))
        .respond_with(ResponseTemplate::new(401))
        .expect(3)
        .mount(&server)
        .await;

    let result = client.execute("/api/stats/summary", &[]).await;
    assert!(
        matches!(result, Err(Error::AuthExhausted { attempts: 3 })),
        "expected AuthExhausted, got: {result:?}"
    );
    assert_eq!(client.attempt_count(), 3);
    assert_eq!(client.session().login_count(), 3);
}

#[tokio::test]
async fn test_custom_policy_limits_attempts() {
    let (server, client) = setup().await;
    let client = client.with_policy(AuthRetryPolicy::new(1));
    mount_auth(&server, "XYZ").await;

    Mock::given(method("GET"))
        .and(path("/api/stats/summary"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.execute("/api/stats/summary", &[]).await;
    assert!(matches!(result, Err(Error::AuthExhausted { attempts: 1 })));
}

#[tokio::test]
async fn test_other_status_is_not_retried() {
    let (server, client) = setup().await;
    mount_auth(&server, "XYZ").await;

    Mock::given(method("GET"))
        .and(path("/api/stats/summary"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.execute("/api/stats/summary", &[]).await;
    assert!(matches!(result, Err(Error::HttpStatus { code: 500 })), "got {result:?}");
    assert_eq!(client.session().login_count(), 1);
}

#[tokio::test]
async fn test_malformed_json_is_decode_error() {
    let (server, client) = setup().await;
    mount_auth(&server, "XYZ").await;

    Mock::given(method("GET"))
        .and(path("/api/stats/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"queries\": "))
        .mount(&server)
        .await;

    let result = client.execute("/api/stats/summary", &[]).await;
    assert!(
        matches!(result, Err(Error::Decode(DecodeError::JsonParse { .. }))),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_deadline_maps_to_connect_error() {
    let (server, client) = setup().await;
    let client = client.with_deadline(Duration::from_millis(200));
    mount_auth(&server, "XYZ").await;

    Mock::given(method("GET"))
        .and(path("/api/stats/summary"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let result = client.execute("/api/stats/summary", &[]).await;
    assert!(matches!(result, Err(Error::Connect { .. })), "got {result:?}");
}

#[tokio::test]
async fn test_transport_error_hides_session_id() {
    let server = MockServer::start().await;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();
    let client = ApiClient::with_transport(
        ReqwestTransport::with_client(http),
        credentials(server.address().port()),
    );
    mount_auth(&server, "SECRETSID").await;

    Mock::given(method("GET"))
        .and(path("/api/stats/summary"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let err = assert_err!(client.execute("/api/stats/summary", &[]).await);
    assert!(matches!(err, Error::Connect { .. }), "got {err:?}");

    let shown = err.to_string();
    assert!(!shown.contains("SECRETSID"), "session id leaked: {shown}");
    assert!(!shown.contains("sid="), "query leaked: {shown}");
    assert!(shown.contains("127.0.0.1"));
}

#[tokio::test]
async fn test_deadline_during_login_resets_state() {
    let (server, client) = setup().await;
    let client = client.with_deadline(Duration::from_millis(200));

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(auth_ok("XYZ").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut states = client.session().subscribe();
    let result = client.execute("/api/stats/summary", &[]).await;
    assert!(matches!(result, Err(Error::Connect { .. })), "got {result:?}");

    assert_eq!(client.session().state(), SessionState::Unauthenticated);
    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_connection_refused_is_connect_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = ApiClient::with_transport(
        ReqwestTransport::with_client(reqwest::Client::new()),
        credentials(port),
    );

    let result = client.execute("/api/stats/summary", &[]).await;
    assert!(matches!(result, Err(Error::Connect { .. })), "got {result:?}");
    assert_eq!(client.session().state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_fetch_is_unauthenticated() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(auth_ok("XYZ"))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "main": { "temp": 21.5 } })))
        .mount(&server)
        .await;

    let url = url::Url::parse(&format!("{}/data/2.5/weather?q=Lyon", server.uri())).unwrap();
    let doc = client.fetch(&url).await.unwrap();
    assert_eq!(doc["main"]["temp"], 21.5);
}
