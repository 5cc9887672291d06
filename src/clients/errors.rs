//! Error types for API client operations.
//!
//! This module contains error types for HTTP operations against the AEMS
//! backend, including the status-code taxonomy used for user-facing
//! notifications, response errors, and token-refresh failures.
//!
//! # Error Handling
//!
//! The SDK uses specific error types for different failure scenarios:
//!
//! - [`ApiResponseError`]: Non-2xx HTTP responses, classified by [`ErrorKind`]
//! - [`RefreshError`]: Token refresh failed; the session has been torn down
//! - [`ApiError`]: Unified error type encompassing all client-side errors
//!
//! # Example
//!
//! ```rust,ignore
//! use aems_api::{ApiError, ErrorKind};
//!
//! match client.get("/sales/metrics").await {
//!     Ok(response) => println!("Metrics: {}", response.body),
//!     Err(ApiError::Response(e)) if e.kind == ErrorKind::NotFound => {
//!         println!("No metrics available");
//!     }
//!     Err(ApiError::Refresh(e)) => {
//!         // Session expired and could not be refreshed; user must log in again
//!         println!("Re-authentication required: {e}");
//!     }
//!     Err(e) => println!("Request failed: {e}"),
//! }
//! ```

use std::fmt;

use thiserror::Error;

/// Classification of a failed API call, derived from the HTTP status code.
///
/// Each failed call is classified into exactly one kind, which drives the
/// single user-facing notification emitted for it. `Unauthorized` is the one
/// silent kind: expired credentials are handled by the refresh/redirect flow
/// rather than a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was malformed (400).
    InvalidRequest,
    /// Credentials are missing or expired (401).
    Unauthorized,
    /// The caller lacks permission for the resource (403).
    Forbidden,
    /// The resource does not exist (404).
    NotFound,
    /// The request was well-formed but semantically invalid (422).
    ValidationFailed,
    /// The caller is being rate limited (429).
    RateLimited,
    /// The backend failed (500, 502, 503, 504).
    Server,
    /// No response was received at all (offline, timeout, connection reset).
    Network,
    /// Any other non-success status.
    Unclassified,
}

impl ErrorKind {
    /// Classifies an HTTP status code.
    ///
    /// # Example
    ///
    /// ```rust
    /// use aems_api::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
    /// assert_eq!(ErrorKind::from_status(503), ErrorKind::Server);
    /// assert_eq!(ErrorKind::from_status(418), ErrorKind::Unclassified);
    /// ```
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            422 => Self::ValidationFailed,
            429 => Self::RateLimited,
            500 | 502 | 503 | 504 => Self::Server,
            _ => Self::Unclassified,
        }
    }

    /// Returns the canonical user-facing message for this kind.
    ///
    /// Used as the notification text when the backend's error body carries
    /// no `message` field of its own.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request",
            Self::Unauthorized => "Your session has expired. Please sign in again.",
            Self::Forbidden => "Access denied. You don't have permission to perform this action.",
            Self::NotFound => "The requested resource was not found.",
            Self::ValidationFailed => "Validation failed",
            Self::RateLimited => "Too many requests. Please try again later.",
            Self::Server => "Server error. Please try again later.",
            Self::Network => "Unable to connect to the server",
            Self::Unclassified => "An unexpected error occurred",
        }
    }

    /// Returns `true` if this kind is reported through a user-facing
    /// notification.
    ///
    /// `Unauthorized` is silent: it is either recovered by a token refresh or
    /// surfaced through the re-authentication signal.
    #[must_use]
    pub const fn is_notified(self) -> bool {
        !matches!(self, Self::Unauthorized)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidRequest => "invalid-request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not-found",
            Self::ValidationFailed => "validation-failed",
            Self::RateLimited => "rate-limited",
            Self::Server => "server-error",
            Self::Network => "network-error",
            Self::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

/// Error returned when an API request receives a non-successful response.
///
/// The message prefers the backend's structured error body (`{ "message": …,
/// "correlationId": … }`), falling back to the [`ErrorKind`]'s canonical
/// text.
///
/// # Example
///
/// ```rust
/// use aems_api::{ApiResponseError, ErrorKind};
///
/// let error = ApiResponseError {
///     status: 404,
///     kind: ErrorKind::NotFound,
///     message: "The requested resource was not found.".to_string(),
///     correlation_id: Some("rust-1712345678-a1b2c3d4e".to_string()),
/// };
///
/// assert!(error.to_string().contains("404"));
/// ```
#[derive(Debug, Error)]
#[error("API request failed with status {status}: {message}")]
pub struct ApiResponseError {
    /// The HTTP status code of the response.
    pub status: u16,
    /// Classification of the failure.
    pub kind: ErrorKind,
    /// Human-readable failure message.
    pub message: String,
    /// Correlation identifier echoed by the backend, for request tracing.
    pub correlation_id: Option<String>,
}

/// Error returned when the token-refresh procedure fails.
///
/// A refresh failure is terminal for the current session: by the time one of
/// these is returned, the client has already cleared its held token, removed
/// the durable refresh token, and signalled that re-authentication is
/// required.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// No refresh token is available in durable storage.
    #[error("No refresh token available")]
    MissingRefreshToken,

    /// The refresh endpoint rejected the refresh token.
    #[error("Token refresh failed with status {status}: {message}")]
    Refused {
        /// The HTTP status code returned by the refresh endpoint.
        status: u16,
        /// The error body returned by the refresh endpoint.
        message: String,
    },

    /// The refresh endpoint returned a body that could not be parsed.
    #[error("Failed to parse token refresh response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// Network error while calling the refresh endpoint.
    #[error("Network error during token refresh: {0}")]
    Network(#[from] reqwest::Error),
}

/// Unified error type for all API client operations.
///
/// This enum provides a single error type for client calls, making it easy
/// to handle failures at API boundaries. Classification and the single
/// user-facing notification have already happened by the time one of these
/// reaches the caller; the error itself is never swallowed.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A non-2xx response, classified by status code.
    #[error(transparent)]
    Response(#[from] ApiResponseError),

    /// Token refresh failed while recovering from a 401; the session has
    /// been torn down.
    #[error(transparent)]
    Refresh(#[from] RefreshError),

    /// Network or connection error (no response received).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    /// Returns the classified response error, if this is one.
    #[must_use]
    pub const fn as_response(&self) -> Option<&ApiResponseError> {
        match self {
            Self::Response(e) => Some(e),
            Self::Refresh(_) | Self::Network(_) => None,
        }
    }
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiError>();
    assert_send_sync::<RefreshError>();
    assert_send_sync::<ApiResponseError>();
};
