mod common;

use common::EventLog;
use layernexus_auth::{ApiRequest, AuthClient, AuthConfig, COOKIE_JAR_KEY, CREDENTIAL_KEY};
use layernexus_storage::{KeyValueStore, SqliteStore};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn open_client(server: &MockServer, state: &Path) -> (AuthClient, Arc<dyn KeyValueStore>) {
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open(state).unwrap());
    let client =
        AuthClient::new(AuthConfig::with_base_url(server.uri()), Arc::clone(&store)).unwrap();
    (client, store)
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "refresh_token=abc; HttpOnly; Path=/")
                .set_body_json(serde_json::json!({ "access_token": "t1" })),
        )
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 1,
            "username": "founder",
            "is_admin": true
        })))
        .mount(server)
        .await;
}

// ── Restart ──────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_after_restart_uses_saved_cookie() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/schemas"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .and(header("cookie", "refresh_token=abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "access_token": "t2" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/schemas"))
        .and(header("authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.db");
    {
        let (client, _) = open_client(&server, &state);
        client.login("founder", "secret").await.unwrap();
    }

    let (client, store) = open_client(&server, &state);
    let events = EventLog::default();
    let client = client.with_session_handler(events.handler());
    let response = client.execute(ApiRequest::get("/schemas")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(store.get(CREDENTIAL_KEY).unwrap().as_deref(), Some("t2"));
    assert_eq!(events.expired_count(), 0);
}

#[tokio::test]
async fn logout_forgets_saved_cookies() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let (client, store) = open_client(&server, &dir.path().join("state.db"));
    client.login("founder", "secret").await.unwrap();
    assert!(store.get(COOKIE_JAR_KEY).unwrap().is_some());

    client.logout().unwrap();

    assert_eq!(store.get(COOKIE_JAR_KEY).unwrap(), None);
    assert_eq!(store.get(CREDENTIAL_KEY).unwrap(), None);
}

#[tokio::test]
async fn unreadable_cookie_jar_starts_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.db");
    SqliteStore::open(&state)
        .unwrap()
        .set(COOKIE_JAR_KEY, "not json")
        .unwrap();

    let (client, _) = open_client(&server, &state);
    let response = client.execute_anonymous(ApiRequest::get("/health")).await.unwrap();

    assert_eq!(response.status(), 200);
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("cookie").is_none());
}
