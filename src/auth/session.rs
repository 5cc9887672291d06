//! Session state types for AEMS authentication.
//!
//! This module provides the records that make up an authentication session:
//! the signed-in [`User`], the [`AuthTokens`] bundle, the in-memory
//! [`AuthState`] snapshot, and the [`PersistedSession`] subset that survives
//! process restarts.
//!
//! # Wire Format
//!
//! All types serialize in the backend's camelCase JSON format
//! (`tenantId`, `accessToken`, `isAuthenticated`, …).
//!
//! # Invariant
//!
//! `AuthState::is_authenticated` is true if and only if `tokens` is present,
//! and `user` is always present while authenticated. State transitions in
//! [`AuthStore`](crate::auth::AuthStore) maintain this; hydration rejects
//! persisted records that violate it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A signed-in AEMS user.
///
/// # Example
///
/// ```rust
/// use aems_api::User;
///
/// let json = r#"{
///     "id": "u-1",
///     "email": "jane@example.com",
///     "firstName": "Jane",
///     "role": "admin",
///     "tenantId": "t-1",
///     "isActive": true,
///     "mfaEnabled": false
/// }"#;
///
/// let user: User = serde_json::from_str(json).unwrap();
/// assert_eq!(user.email, "jane@example.com");
/// assert!(user.last_name.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: String,

    /// The user's email address.
    pub email: String,

    /// The user's first name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// The user's last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// The user's role within the tenant.
    pub role: String,

    /// The tenant this user belongs to.
    pub tenant_id: String,

    /// Whether the account is active.
    pub is_active: bool,

    /// Whether multi-factor authentication is enabled.
    pub mfa_enabled: bool,

    /// When the user last logged in, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Shallow-merges the set fields of `update` into this user.
    ///
    /// Fields left `None` in the update are untouched.
    pub fn apply(&mut self, update: UserUpdate) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(first_name) = update.first_name {
            self.first_name = Some(first_name);
        }
        if let Some(last_name) = update.last_name {
            self.last_name = Some(last_name);
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(mfa_enabled) = update.mfa_enabled {
            self.mfa_enabled = mfa_enabled;
        }
        if let Some(last_login_at) = update.last_login_at {
            self.last_login_at = Some(last_login_at);
        }
    }
}

/// A partial [`User`] for shallow merges via
/// [`AuthStore::update_user`](crate::auth::AuthStore::update_user).
///
/// Only set fields are applied; identity fields (`id`, `tenant_id`) cannot
/// be changed through an update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    /// New email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// New first name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// New last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// New role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// New active flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    /// New multi-factor flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mfa_enabled: Option<bool>,

    /// New last-login timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// The token bundle returned by the login and refresh endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    /// Short-lived credential attached to outbound requests.
    pub access_token: String,

    /// Longer-lived credential used solely to obtain a new access token.
    pub refresh_token: String,

    /// Token type, e.g. `bearer`.
    pub token_type: String,

    /// Access-token lifetime in seconds.
    pub expires_in: u64,
}

/// A snapshot of the in-memory authentication state.
///
/// Obtained from [`AuthStore::state`](crate::auth::AuthStore::state).
/// `is_loading` and `error` are transient and never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    /// The signed-in user; present iff authenticated.
    pub user: Option<User>,

    /// The current token bundle; present iff authenticated.
    pub tokens: Option<AuthTokens>,

    /// Whether a login or refresh established this session.
    pub is_authenticated: bool,

    /// Whether a login or logout operation is in flight.
    pub is_loading: bool,

    /// The last failure message, cleared by the next successful operation.
    pub error: Option<String>,
}

impl AuthState {
    /// Returns `true` if the state satisfies the session invariant:
    /// authenticated exactly when tokens are held, with a user present
    /// whenever authenticated.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        if self.is_authenticated {
            self.tokens.is_some() && self.user.is_some()
        } else {
            self.tokens.is_none()
        }
    }
}

/// The durable subset of the session, persisted across process restarts.
///
/// `is_loading` and `error` are deliberately absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    /// The signed-in user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    /// The token bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<AuthTokens>,

    /// Whether the persisted session was authenticated.
    pub is_authenticated: bool,
}

// Verify session types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<User>();
    assert_send_sync::<AuthTokens>();
    assert_send_sync::<AuthState>();
    assert_send_sync::<PersistedSession>();
};
