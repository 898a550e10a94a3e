//! End-to-end session bootstrap tests against a mock API.

use fortuna_auth::{AuthSession, Bootstrap, CredentialStore, Phase, SessionConfig};
use fortuna_client::FortunaClient;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> FortunaClient {
    FortunaClient::builder()
        .base_url(server.uri())
        .build()
        .unwrap()
}

fn session_for(server: &MockServer, store: CredentialStore, config: SessionConfig) -> AuthSession {
    AuthSession::new(client_for(server), store, config)
}

async fn mount_profile(server: &MockServer, body: serde_json::Value, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path("/api/profile/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_hits)
        .mount(server)
        .await;
}

fn verify_body(user_id: &str) -> serde_json::Value {
    serde_json::json!({
        "token": "access-1",
        "refreshToken": "refresh-1",
        "expiresIn": 3600,
        "user": {"id": user_id, "email": "user@example.com"}
    })
}

#[tokio::test]
async fn test_login_persists_credentials_for_later_hydrate() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/verify-code"))
        .and(body_json(serde_json::json!({
            "emailOrPhone": "user@example.com",
            "code": "123456"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(verify_body("u1")))
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    let session = session_for(&server, store.clone(), SessionConfig::default());

    let response = session.login("user@example.com", "123456").await.unwrap();
    assert_eq!(response.user.id, "u1");
    assert_eq!(session.phase(), Phase::Authenticated);

    // Server-relative expiry became an absolute future timestamp.
    let token = store.token().unwrap();
    assert!(token.expires_at > now_millis());
    assert_eq!(token.refresh_token.as_deref(), Some("refresh-1"));

    // A second session over the same store hydrates without a network call.
    let rehydrated = session_for(&server, store, SessionConfig::default());
    assert!(rehydrated.hydrate());
    assert_eq!(rehydrated.state().user.unwrap().id, "u1");
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

#[tokio::test]
async fn test_login_failure_propagates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/verify-code"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({"message": "bad code"})),
        )
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    let session = session_for(&server, store.clone(), SessionConfig::default());

    let err = session.login("user@example.com", "000000").await.unwrap_err();
    assert!(err.to_string().contains("bad code"));
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_initialize_confirms_identity_remotely() {
    let server = MockServer::start().await;
    mount_profile(&server, serde_json::json!({"id": "u1"}), 1).await;

    let session = session_for(
        &server,
        CredentialStore::in_memory(),
        SessionConfig::default(),
    );

    let outcome = session.initialize().await;
    match outcome {
        Bootstrap::Authenticated(user) => assert_eq!(user.id, "u1"),
        other => panic!("expected authenticated bootstrap, got {other:?}"),
    }

    let state = session.state();
    assert!(!state.is_loading);
    assert_eq!(state.error, None);
    assert_eq!(state.user.unwrap().id, "u1");
}

#[tokio::test]
async fn test_initialize_redirects_when_auth_required_and_absent() {
    let server = MockServer::start().await;
    mount_profile(&server, serde_json::Value::Null, 1).await;

    let session = session_for(
        &server,
        CredentialStore::in_memory(),
        SessionConfig::new().with_require_auth(true),
    );

    let outcome = session.initialize().await;
    assert_eq!(outcome, Bootstrap::RedirectTo("/auth/login".to_string()));
    assert_eq!(session.phase(), Phase::Unauthenticated);
}

#[tokio::test]
async fn test_initialize_anonymous_when_auth_not_required() {
    let server = MockServer::start().await;
    mount_profile(&server, serde_json::Value::Null, 1).await;

    let session = session_for(
        &server,
        CredentialStore::in_memory(),
        SessionConfig::default(),
    );

    assert_eq!(session.initialize().await, Bootstrap::Anonymous);
}

#[tokio::test]
async fn test_initialize_failure_carries_message_and_redirects() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/profile/me"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let session = session_for(
        &server,
        CredentialStore::in_memory(),
        SessionConfig::new().with_require_auth(true).with_login_redirect("/signin"),
    );

    let outcome = session.initialize().await;
    assert_eq!(outcome, Bootstrap::RedirectTo("/signin".to_string()));
    assert_eq!(session.phase(), Phase::Error);
    assert!(session.state().error.unwrap().contains("500"));
}

#[tokio::test]
async fn test_refresh_forces_network_while_current_user_is_cached() {
    let server = MockServer::start().await;
    // Two forced loads; the cached reads in between must not fetch.
    mount_profile(&server, serde_json::json!({"id": "u1"}), 2).await;

    let session = session_for(
        &server,
        CredentialStore::in_memory(),
        SessionConfig::default(),
    );

    session.initialize().await;

    let user = session.current_user().await.unwrap().unwrap();
    assert_eq!(user.id, "u1");
    session.current_user().await.unwrap();

    session.refresh().await;
}

#[tokio::test]
async fn test_unauthenticated_rejection_is_absent_identity() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/profile/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = session_for(
        &server,
        CredentialStore::in_memory(),
        SessionConfig::default(),
    );

    // A 401 is "no identity", not a load error.
    assert_eq!(session.initialize().await, Bootstrap::Anonymous);
    assert_eq!(session.phase(), Phase::Unauthenticated);
    assert_eq!(session.state().error, None);
}

#[tokio::test]
async fn test_logout_clears_everything_without_network() {
    let server = MockServer::start().await;
    mount_profile(&server, serde_json::json!({"id": "u1"}), 1).await;

    let store = CredentialStore::in_memory();
    let session = session_for(&server, store.clone(), SessionConfig::default());
    session.initialize().await;

    session.logout();

    assert_eq!(session.phase(), Phase::Unauthenticated);
    assert!(!store.is_authenticated());
    // No network call: the profile mock allows exactly the one initialize hit.
    assert_eq!(session.current_user().await.unwrap(), None);
}

#[tokio::test]
async fn test_refresh_session_exchanges_stored_refresh_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/verify-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(verify_body("u1")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(serde_json::json!({"refreshToken": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "access-2",
            "refreshToken": "refresh-2",
            "expiresIn": 3600,
            "user": {"id": "u1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    let session = session_for(&server, store.clone(), SessionConfig::default());

    session.login("user@example.com", "123456").await.unwrap();

    let renewed = session.refresh_session().await.unwrap().unwrap();
    assert_eq!(renewed.token, "access-2");
    assert_eq!(store.token().unwrap().token, "access-2");
    assert_eq!(store.stored_refresh_token().as_deref(), Some("refresh-2"));
}

#[tokio::test]
async fn test_refresh_session_without_stored_token_is_none() {
    let server = MockServer::start().await;

    let session = session_for(
        &server,
        CredentialStore::in_memory(),
        SessionConfig::default(),
    );

    // No mock mounted: a network call here would fail the test.
    assert!(session.refresh_session().await.unwrap().is_none());
}

#[tokio::test]
async fn test_hydrated_token_authenticates_profile_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/verify-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(verify_body("u1")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/profile/me"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "u1"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    let login_session = session_for(&server, store.clone(), SessionConfig::default());
    login_session.login("user@example.com", "123456").await.unwrap();

    // A fresh session picks the bearer token up from storage.
    let session = session_for(&server, store, SessionConfig::default());
    let outcome = session.initialize().await;
    assert!(matches!(outcome, Bootstrap::Authenticated(_)));
}
