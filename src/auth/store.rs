//! The auth session store.
//!
//! This module provides [`AuthStore`], the owner of the session lifecycle:
//! it orchestrates the backend's auth endpoints through the shared
//! [`ApiClient`], keeps the in-memory [`AuthState`], and persists the
//! durable subset across restarts.
//!
//! # State Machine
//!
//! The store moves between five states, tracked by the `is_authenticated`
//! and `is_loading` flags:
//!
//! - **anonymous**: no user, no tokens
//! - **authenticating**: `login` in flight (`is_loading`)
//! - **authenticated**: user and tokens held
//! - **refreshing**: `refresh` in flight; `is_authenticated` stays true and
//!   `is_loading` is not raised, so readers see an uninterrupted session
//! - **logging-out**: `logout` in flight (`is_loading`)
//!
//! The store starts anonymous unless [`AuthStore::hydrate`] restores a
//! previously persisted authenticated session, in which case it enters
//! `authenticated` without contacting the server.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use aems_api::{ApiClient, ApiConfig, AuthStore, BaseUrl};
//! use aems_api::notify::LogNotifier;
//! use aems_api::storage::FileStorage;
//!
//! let config = ApiConfig::builder()
//!     .base_url(BaseUrl::new("http://localhost:8000/api").unwrap())
//!     .build()
//!     .unwrap();
//! let storage = Arc::new(FileStorage::open("session.json").unwrap());
//! let client = Arc::new(ApiClient::new(&config, storage.clone(), Arc::new(LogNotifier)));
//! let store = AuthStore::new(client, storage, &config);
//!
//! if !store.hydrate() {
//!     store.login("jane@example.com", "secret", false).await?;
//! }
//! assert!(store.is_authenticated());
//! ```

use std::sync::{Arc, RwLock, RwLockWriteGuard};

use crate::auth::endpoints::{
    self, ChangePasswordRequest, LoginRequest, LoginResponse, RefreshTokenRequest,
    RefreshTokenResponse,
};
use crate::auth::error::{AuthError, SessionLoadError};
use crate::auth::session::{AuthState, AuthTokens, PersistedSession, User, UserUpdate};
use crate::clients::{ApiClient, ApiError, HttpMethod, HttpRequest};
use crate::config::{ApiConfig, StorageKey};
use crate::storage::Storage;

/// Owns the authentication session lifecycle.
///
/// Exactly one instance should exist per application, sharing the same
/// [`ApiClient`] and [`Storage`] it was composed with.
///
/// # Thread Safety
///
/// `AuthStore` is `Send + Sync`. State reads return snapshots; mutations
/// take a short write lock that is never held across `.await`.
pub struct AuthStore {
    client: Arc<ApiClient>,
    storage: Arc<dyn Storage>,
    session_key: StorageKey,
    refresh_token_key: StorageKey,
    state: RwLock<AuthState>,
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("session_key", &self.session_key)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// Verify AuthStore is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthStore>();
};

impl AuthStore {
    /// Creates a new store in the anonymous state.
    ///
    /// Call [`AuthStore::hydrate`] afterwards to restore a persisted
    /// session.
    #[must_use]
    pub fn new(client: Arc<ApiClient>, storage: Arc<dyn Storage>, config: &ApiConfig) -> Self {
        Self {
            client,
            storage,
            session_key: config.session_storage_key().clone(),
            refresh_token_key: config.refresh_token_storage_key().clone(),
            state: RwLock::new(AuthState::default()),
        }
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Returns `true` if a session is currently established.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated
    }

    /// Returns the signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state().user
    }

    /// Restores a previously persisted session from durable storage.
    ///
    /// A persisted authenticated record moves the store straight into the
    /// authenticated state (without contacting the server) and pushes its
    /// access token into the client. Anything else (no record, unreadable
    /// storage, undecodable or inconsistent record, anonymous record)
    /// leaves the store anonymous.
    ///
    /// Returns `true` if an authenticated session was restored.
    pub fn hydrate(&self) -> bool {
        match self.load_persisted() {
            Ok(PersistedSession {
                user: Some(user),
                tokens: Some(tokens),
                is_authenticated: true,
            }) => {
                let access_token = tokens.access_token.clone();
                {
                    let mut state = self.state_write();
                    state.user = Some(user);
                    state.tokens = Some(tokens);
                    state.is_authenticated = true;
                    state.is_loading = false;
                    state.error = None;
                }
                self.client.set_auth_token(access_token);
                tracing::debug!("Restored persisted session");
                true
            }
            Ok(_) => false,
            Err(SessionLoadError::Missing) => false,
            Err(err) => {
                tracing::warn!(error = %err, "Discarding unusable persisted session");
                false
            }
        }
    }

    /// Loads and validates the persisted session record.
    ///
    /// # Errors
    ///
    /// Returns [`SessionLoadError`] if no record is present, storage cannot
    /// be read, the record cannot be decoded, or the record violates the
    /// session invariant.
    pub fn load_persisted(&self) -> Result<PersistedSession, SessionLoadError> {
        let raw = self
            .storage
            .get(self.session_key.as_ref())?
            .ok_or(SessionLoadError::Missing)?;

        let session: PersistedSession = serde_json::from_str(&raw)?;

        let consistent = if session.is_authenticated {
            session.user.is_some() && session.tokens.is_some()
        } else {
            session.tokens.is_none()
        };
        if !consistent {
            return Err(SessionLoadError::Inconsistent);
        }

        Ok(session)
    }

    /// Authenticates with email and password.
    ///
    /// On success the store holds the returned user and tokens, the client
    /// holds the new access token, and the durable subset is persisted. On
    /// failure the store returns to anonymous with the failure message in
    /// `error`, and the error is re-raised.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the login call fails or its response cannot
    /// be parsed.
    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
        remember_me: bool,
    ) -> Result<(), AuthError> {
        {
            let mut state = self.state_write();
            state.is_loading = true;
            state.error = None;
        }

        let request = LoginRequest {
            email: email.into(),
            password: password.into(),
            remember_me: Some(remember_me),
        };

        match self.perform_login(&request).await {
            Ok((user, tokens)) => {
                let access_token = tokens.access_token.clone();
                {
                    let mut state = self.state_write();
                    state.user = Some(user);
                    state.tokens = Some(tokens);
                    state.is_authenticated = true;
                    state.is_loading = false;
                    state.error = None;
                }
                self.client.set_auth_token(access_token);
                self.persist();
                Ok(())
            }
            Err(err) => {
                let message = match &err {
                    AuthError::Api(ApiError::Response(response)) => response.message.clone(),
                    _ => "Login failed".to_string(),
                };
                {
                    let mut state = self.state_write();
                    state.user = None;
                    state.tokens = None;
                    state.is_authenticated = false;
                    state.is_loading = false;
                    state.error = Some(message);
                }
                Err(err)
            }
        }
    }

    async fn perform_login(&self, request: &LoginRequest) -> Result<(User, AuthTokens), AuthError> {
        let body = serde_json::to_value(request)?;
        let response = self
            .client
            .request(
                HttpRequest::builder(HttpMethod::Post, endpoints::LOGIN_PATH)
                    .body(body)
                    .build(),
            )
            .await?;

        let login: LoginResponse = response.json()?;
        let tokens = AuthTokens {
            access_token: login.access_token,
            refresh_token: login.refresh_token,
            token_type: login.token_type,
            expires_in: login.expires_in,
        };
        Ok((login.user, tokens))
    }

    /// Ends the session.
    ///
    /// The remote logout call is best-effort: a failure is logged and never
    /// re-raised. Regardless of the remote outcome, all session state is
    /// cleared, the client's held token is removed, and both durable keys
    /// are deleted. The store always ends anonymous.
    pub async fn logout(&self) {
        self.state_write().is_loading = true;

        if let Err(err) = self.client.post(endpoints::LOGOUT_PATH, None).await {
            tracing::warn!(error = %err, "Logout API call failed");
        }

        *self.state_write() = AuthState::default();
        self.client.remove_auth_token();

        if let Err(err) = self.storage.remove(self.session_key.as_ref()) {
            tracing::warn!(error = %err, "Failed to remove persisted session");
        }
        if let Err(err) = self.storage.remove(self.refresh_token_key.as_ref()) {
            tracing::warn!(error = %err, "Failed to remove stored refresh token");
        }
    }

    /// Exchanges the held refresh token for a new token bundle.
    ///
    /// The session stays authenticated while the refresh is in flight; on
    /// success the tokens are replaced in place (the user is untouched) and
    /// the client receives the new access token. On failure the session is
    /// fully torn down via [`AuthStore::logout`] and the error re-raised.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingRefreshToken`], without a network call,
    /// if no refresh token is held, or the underlying failure otherwise.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let refresh_token = self
            .state()
            .tokens
            .map(|tokens| tokens.refresh_token)
            .ok_or(AuthError::MissingRefreshToken)?;

        match self.perform_refresh(refresh_token).await {
            Ok(tokens) => {
                let access_token = tokens.access_token.clone();
                {
                    let mut state = self.state_write();
                    state.tokens = Some(tokens);
                    state.error = None;
                }
                self.client.set_auth_token(access_token);
                self.persist();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Token refresh failed; ending session");
                self.logout().await;
                Err(err)
            }
        }
    }

    async fn perform_refresh(&self, refresh_token: String) -> Result<AuthTokens, AuthError> {
        let body = serde_json::to_value(RefreshTokenRequest { refresh_token })?;
        let response = self
            .client
            .request(
                HttpRequest::builder(HttpMethod::Post, endpoints::REFRESH_PATH)
                    .body(body)
                    .build(),
            )
            .await?;

        let refreshed: RefreshTokenResponse = response.json()?;
        Ok(AuthTokens {
            access_token: refreshed.access_token,
            refresh_token: refreshed.refresh_token,
            token_type: refreshed.token_type,
            expires_in: refreshed.expires_in,
        })
    }

    /// Fetches the current user record from the backend.
    ///
    /// While authenticated, the stored user record is replaced with the
    /// fresh one and persisted.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the call fails or the response cannot be
    /// parsed.
    pub async fn fetch_current_user(&self) -> Result<User, AuthError> {
        let response = self.client.get(endpoints::ME_PATH).await?;
        let user: User = response.json()?;

        let updated = {
            let mut state = self.state_write();
            if state.is_authenticated {
                state.user = Some(user.clone());
                true
            } else {
                false
            }
        };
        if updated {
            self.persist();
        }

        Ok(user)
    }

    /// Changes the signed-in user's password.
    ///
    /// Session state is untouched either way.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the call fails.
    pub async fn change_password(
        &self,
        current_password: impl Into<String>,
        new_password: impl Into<String>,
    ) -> Result<(), AuthError> {
        let body = serde_json::to_value(ChangePasswordRequest {
            current_password: current_password.into(),
            new_password: new_password.into(),
        })?;
        self.client.put(endpoints::PASSWORD_PATH, body).await?;
        Ok(())
    }

    /// Shallow-merges `update` into the current user.
    ///
    /// A no-op while no user is present. Tokens and the authenticated flag
    /// are never touched.
    pub fn update_user(&self, update: UserUpdate) {
        let updated = {
            let mut state = self.state_write();
            match state.user.as_mut() {
                Some(user) => {
                    user.apply(update);
                    true
                }
                None => false,
            }
        };
        if updated {
            self.persist();
        }
    }

    /// Clears the last failure message.
    pub fn clear_error(&self) {
        self.state_write().error = None;
    }

    /// Persists the durable subset of the current state, best-effort.
    ///
    /// Writes the session record under the session key and the raw refresh
    /// token under the refresh-token key. Failures are logged and ignored.
    fn persist(&self) {
        let state = self.state();
        let record = PersistedSession {
            user: state.user,
            tokens: state.tokens,
            is_authenticated: state.is_authenticated,
        };

        match serde_json::to_string(&record) {
            Ok(serialized) => {
                if let Err(err) = self.storage.set(self.session_key.as_ref(), &serialized) {
                    tracing::warn!(error = %err, "Failed to persist session");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to serialize session for persistence");
            }
        }

        if let Some(tokens) = &record.tokens {
            if let Err(err) = self
                .storage
                .set(self.refresh_token_key.as_ref(), &tokens.refresh_token)
            {
                tracing::warn!(error = %err, "Failed to persist refresh token");
            }
        }
    }

    fn state_write(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
