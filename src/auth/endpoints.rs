//! Authentication endpoint paths and wire types.
//!
//! The AEMS backend exposes its authentication operations under `/auth/*`.
//! This module holds the endpoint paths and the request/response bodies they
//! exchange, serialized in the backend's camelCase format.

use serde::{Deserialize, Serialize};

use crate::auth::session::User;

/// Login endpoint path.
pub const LOGIN_PATH: &str = "/auth/login";

/// Logout endpoint path.
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Token refresh endpoint path.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Current-user endpoint path.
pub const ME_PATH: &str = "/auth/me";

/// Password change endpoint path.
pub const PASSWORD_PATH: &str = "/auth/password";

/// Request body for the login endpoint.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// The user's email address.
    pub email: String,
    /// The user's password.
    pub password: String,
    /// Whether the session should be long-lived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remember_me: Option<bool>,
}

/// Response body from the login endpoint.
///
/// The token fields arrive flattened alongside the user record.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// The authenticated user.
    pub user: User,
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Token type, e.g. `bearer`.
    pub token_type: String,
    /// Access-token lifetime in seconds.
    pub expires_in: u64,
}

/// Request body for the refresh endpoint.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// The refresh token to exchange.
    pub refresh_token: String,
}

/// Response body from the refresh endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    /// The new access token.
    pub access_token: String,
    /// The rotated refresh token.
    pub refresh_token: String,
    /// Token type, e.g. `bearer`.
    pub token_type: String,
    /// Access-token lifetime in seconds.
    pub expires_in: u64,
}

/// Request body for the password change endpoint.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// The user's current password.
    pub current_password: String,
    /// The new password.
    pub new_password: String,
}
