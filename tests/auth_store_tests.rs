//! Integration tests for the auth session store.
//!
//! These tests run against a wiremock server and verify the login, logout,
//! refresh, and hydration transitions, the persistence contract, and the
//! end-to-end silent-recovery scenario.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aems_api::notify::Notifier;
use aems_api::storage::{MemoryStorage, Storage};
use aems_api::{
    ApiClient, ApiConfig, ApiError, AuthError, AuthStore, BaseUrl, ErrorKind, PersistedSession,
    RefreshError, UserUpdate,
};
use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records every notification so tests can assert the exactly-once contract.
#[derive(Default)]
struct RecordingNotifier {
    error_count: AtomicUsize,
    reauth_count: AtomicUsize,
    last_message: Mutex<Option<String>>,
}

impl Notifier for RecordingNotifier {
    fn error(&self, _kind: ErrorKind, message: &str) {
        self.error_count.fetch_add(1, Ordering::SeqCst);
        *self.last_message.lock().unwrap() = Some(message.to_string());
    }

    fn authentication_required(&self) {
        self.reauth_count.fetch_add(1, Ordering::SeqCst);
    }
}

struct TestEnv {
    config: ApiConfig,
    storage: Arc<MemoryStorage>,
    notifier: Arc<RecordingNotifier>,
    client: Arc<ApiClient>,
    store: AuthStore,
}

fn create_env(base_url: &str) -> TestEnv {
    let config = ApiConfig::builder()
        .base_url(BaseUrl::new(base_url).unwrap())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let storage = Arc::new(MemoryStorage::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let client = Arc::new(ApiClient::new(&config, storage.clone(), notifier.clone()));
    let store = AuthStore::new(client.clone(), storage.clone(), &config);
    TestEnv {
        config,
        storage,
        notifier,
        client,
        store,
    }
}

fn user_body() -> serde_json::Value {
    json!({
        "id": "u-1",
        "email": "jane@example.com",
        "firstName": "Jane",
        "lastName": "Doe",
        "role": "admin",
        "tenantId": "t-1",
        "isActive": true,
        "mfaEnabled": false,
        "lastLoginAt": "2026-08-01T09:30:00Z"
    })
}

fn login_body() -> serde_json::Value {
    json!({
        "user": user_body(),
        "accessToken": "access-1",
        "refreshToken": "refresh-1",
        "tokenType": "bearer",
        "expiresIn": 900
    })
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
        .mount(server)
        .await;
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_success_populates_state_and_persists() {
    let server = MockServer::start().await;
    let env = create_env(&server.uri());
    mount_login(&server).await;

    env.store.login("jane@example.com", "secret", true).await.unwrap();

    let state = env.store.state();
    assert!(state.is_authenticated);
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert_eq!(state.user.as_ref().unwrap().email, "jane@example.com");
    let tokens = state.tokens.unwrap();
    assert_eq!(tokens.access_token, "access-1");
    assert_eq!(tokens.refresh_token, "refresh-1");

    // Client mirrors the access token
    assert_eq!(env.client.auth_token(), Some("access-1".to_string()));

    // Durable subset persisted under both keys
    let record: PersistedSession = serde_json::from_str(
        &env.storage.get("aems_auth_state").unwrap().unwrap(),
    )
    .unwrap();
    assert!(record.is_authenticated);
    assert_eq!(record.tokens.unwrap().access_token, "access-1");
    assert_eq!(
        env.storage.get("aems_refresh_token").unwrap(),
        Some("refresh-1".to_string())
    );

    // No notifications on success
    assert_eq!(env.notifier.error_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_login_sends_credentials_and_remember_me() {
    let server = MockServer::start().await;
    let env = create_env(&server.uri());

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({
            "email": "jane@example.com",
            "password": "secret",
            "rememberMe": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
        .expect(1)
        .mount(&server)
        .await;

    env.store.login("jane@example.com", "secret", false).await.unwrap();
}

#[tokio::test]
async fn test_login_failure_stores_backend_message_and_reraises() {
    let server = MockServer::start().await;
    let env = create_env(&server.uri());

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Bad Request",
            "message": "Invalid credentials"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = env.store.login("jane@example.com", "wrong", false).await.unwrap_err();
    match err {
        AuthError::Api(ApiError::Response(response)) => {
            assert_eq!(response.status, 400);
        }
        other => panic!("Expected API response error, got: {other:?}"),
    }

    let state = env.store.state();
    assert!(!state.is_authenticated);
    assert!(!state.is_loading);
    assert!(state.user.is_none());
    assert!(state.tokens.is_none());
    assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
    assert!(env.client.auth_token().is_none());
}

#[tokio::test]
async fn test_login_401_without_refresh_token_falls_back_to_generic_error() {
    let server = MockServer::start().await;
    let env = create_env(&server.uri());

    // No refresh token in storage: the 401 triggers an immediate refresh
    // failure and the login call rejects with the refresh error.
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = env.store.login("jane@example.com", "wrong", false).await.unwrap_err();
    assert!(matches!(
        err,
        AuthError::Api(ApiError::Refresh(RefreshError::MissingRefreshToken))
    ));

    let state = env.store.state();
    assert!(!state.is_authenticated);
    assert_eq!(state.error.as_deref(), Some("Login failed"));
    assert_eq!(env.notifier.reauth_count.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_clears_everything_on_success() {
    let server = MockServer::start().await;
    let env = create_env(&server.uri());
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    env.store.login("jane@example.com", "secret", false).await.unwrap();
    env.store.logout().await;

    let state = env.store.state();
    assert!(!state.is_authenticated);
    assert!(!state.is_loading);
    assert!(state.user.is_none());
    assert!(state.tokens.is_none());
    assert!(state.error.is_none());
    assert!(env.client.auth_token().is_none());
    assert_eq!(env.storage.get("aems_auth_state").unwrap(), None);
    assert_eq!(env.storage.get("aems_refresh_token").unwrap(), None);
}

#[tokio::test]
async fn test_logout_clears_everything_when_remote_call_fails() {
    let server = MockServer::start().await;
    let env = create_env(&server.uri());
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    env.store.login("jane@example.com", "secret", false).await.unwrap();
    // Never raises, even though the remote call failed
    env.store.logout().await;

    let state = env.store.state();
    assert!(!state.is_authenticated);
    assert!(state.user.is_none());
    assert!(state.tokens.is_none());
    assert!(env.client.auth_token().is_none());
    assert_eq!(env.storage.get("aems_auth_state").unwrap(), None);
    assert_eq!(env.storage.get("aems_refresh_token").unwrap(), None);
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn test_refresh_replaces_tokens_in_place() {
    let server = MockServer::start().await;
    let env = create_env(&server.uri());
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refreshToken": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-2",
            "refreshToken": "refresh-2",
            "tokenType": "bearer",
            "expiresIn": 900
        })))
        .expect(1)
        .mount(&server)
        .await;

    env.store.login("jane@example.com", "secret", false).await.unwrap();
    env.store.refresh().await.unwrap();

    let state = env.store.state();
    assert!(state.is_authenticated);
    let tokens = state.tokens.unwrap();
    assert_eq!(tokens.access_token, "access-2");
    assert_eq!(tokens.refresh_token, "refresh-2");
    // User untouched
    assert_eq!(state.user.unwrap().id, "u-1");

    assert_eq!(env.client.auth_token(), Some("access-2".to_string()));
    assert_eq!(
        env.storage.get("aems_refresh_token").unwrap(),
        Some("refresh-2".to_string())
    );
}

#[tokio::test]
async fn test_refresh_without_token_makes_no_network_call() {
    let server = MockServer::start().await;
    let env = create_env(&server.uri());

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = env.store.refresh().await.unwrap_err();
    assert!(matches!(err, AuthError::MissingRefreshToken));
}

#[tokio::test]
async fn test_refresh_failure_ends_in_logout_state_and_reraises() {
    let server = MockServer::start().await;
    let env = create_env(&server.uri());
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    env.store.login("jane@example.com", "secret", false).await.unwrap();

    let err = env.store.refresh().await.unwrap_err();
    match err {
        AuthError::Api(ApiError::Response(response)) => {
            assert_eq!(response.kind, ErrorKind::Server);
        }
        other => panic!("Expected API response error, got: {other:?}"),
    }

    // Same end state as logout()
    let state = env.store.state();
    assert!(!state.is_authenticated);
    assert!(state.user.is_none());
    assert!(state.tokens.is_none());
    assert!(env.client.auth_token().is_none());
    assert_eq!(env.storage.get("aems_auth_state").unwrap(), None);
    assert_eq!(env.storage.get("aems_refresh_token").unwrap(), None);
}

// ============================================================================
// Hydration across restarts
// ============================================================================

#[tokio::test]
async fn test_session_survives_restart_via_hydrate() {
    let server = MockServer::start().await;
    let env = create_env(&server.uri());
    mount_login(&server).await;

    env.store.login("jane@example.com", "secret", true).await.unwrap();

    // Simulate a process restart: a new client and store over the same storage
    let client2 = Arc::new(ApiClient::new(
        &env.config,
        env.storage.clone(),
        env.notifier.clone(),
    ));
    let store2 = AuthStore::new(client2.clone(), env.storage.clone(), &env.config);

    assert!(store2.hydrate());

    let state = store2.state();
    assert!(state.is_authenticated);
    assert_eq!(state.user.unwrap().email, "jane@example.com");
    assert_eq!(client2.auth_token(), Some("access-1".to_string()));
}

// ============================================================================
// User updates and password change
// ============================================================================

#[tokio::test]
async fn test_update_user_shallow_merge_after_login() {
    let server = MockServer::start().await;
    let env = create_env(&server.uri());
    mount_login(&server).await;

    env.store.login("jane@example.com", "secret", false).await.unwrap();
    env.store.update_user(UserUpdate {
        first_name: Some("Janet".to_string()),
        ..UserUpdate::default()
    });

    let user = env.store.current_user().unwrap();
    assert_eq!(user.first_name.as_deref(), Some("Janet"));
    assert_eq!(user.last_name.as_deref(), Some("Doe"));

    // Tokens untouched by a user update
    assert_eq!(env.store.state().tokens.unwrap().access_token, "access-1");
}

#[tokio::test]
async fn test_fetch_current_user_refreshes_stored_record() {
    let server = MockServer::start().await;
    let env = create_env(&server.uri());
    mount_login(&server).await;

    let mut updated = user_body();
    updated["firstName"] = json!("Janet");
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(bearer_token("access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .expect(1)
        .mount(&server)
        .await;

    env.store.login("jane@example.com", "secret", false).await.unwrap();
    let user = env.store.fetch_current_user().await.unwrap();

    assert_eq!(user.first_name.as_deref(), Some("Janet"));
    assert_eq!(
        env.store.current_user().unwrap().first_name.as_deref(),
        Some("Janet")
    );

    // Persisted record reflects the fresh user
    let record: PersistedSession = serde_json::from_str(
        &env.storage.get("aems_auth_state").unwrap().unwrap(),
    )
    .unwrap();
    assert_eq!(record.user.unwrap().first_name.as_deref(), Some("Janet"));
}

#[tokio::test]
async fn test_change_password_leaves_session_untouched() {
    let server = MockServer::start().await;
    let env = create_env(&server.uri());
    mount_login(&server).await;
    Mock::given(method("PUT"))
        .and(path("/auth/password"))
        .and(body_json(json!({
            "currentPassword": "secret",
            "newPassword": "stronger"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    env.store.login("jane@example.com", "secret", false).await.unwrap();
    env.store.change_password("secret", "stronger").await.unwrap();

    let state = env.store.state();
    assert!(state.is_authenticated);
    assert_eq!(state.tokens.unwrap().access_token, "access-1");
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[tokio::test]
async fn test_silent_recovery_scenario() {
    // login succeeds -> GET /protected returns 401 -> client silently
    // refreshes -> replay succeeds -> caller sees only the 200
    let server = MockServer::start().await;
    let env = create_env(&server.uri());
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/protected"))
        .and(bearer_token("access-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/protected"))
        .and(bearer_token("access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"secret": 42})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refreshToken": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-2",
            "refreshToken": "refresh-2",
            "tokenType": "bearer",
            "expiresIn": 900
        })))
        .expect(1)
        .mount(&server)
        .await;

    env.store.login("jane@example.com", "secret", false).await.unwrap();

    let response = env.client.get("/protected").await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body["secret"], 42);

    // Recovery was invisible: no notifications, session still authenticated
    assert_eq!(env.notifier.error_count.load(Ordering::SeqCst), 0);
    assert_eq!(env.notifier.reauth_count.load(Ordering::SeqCst), 0);
    assert!(env.store.is_authenticated());
}

#[tokio::test]
async fn test_absent_refresh_token_scenario() {
    // refresh token absent -> any request returning 401 rejects with the
    // refresh error and the session is cleared
    let server = MockServer::start().await;
    let env = create_env(&server.uri());

    Mock::given(method("GET"))
        .and(path("/protected"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    env.client.set_auth_token("orphan-token");

    let err = env.client.get("/protected").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Refresh(RefreshError::MissingRefreshToken)
    ));
    assert!(env.client.auth_token().is_none());
    assert_eq!(env.notifier.reauth_count.load(Ordering::SeqCst), 1);
}
