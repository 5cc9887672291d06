//! Error types for session store operations.
//!
//! This module contains error types for the auth session lifecycle: store
//! operations that fail ([`AuthError`]) and session hydration failures
//! ([`SessionLoadError`]).

use thiserror::Error;

use crate::clients::ApiError;
use crate::storage::StorageError;

/// Errors that can occur during session store operations.
///
/// # Example
///
/// ```rust,ignore
/// use aems_api::auth::AuthError;
///
/// match store.refresh().await {
///     Ok(()) => {}
///     Err(AuthError::MissingRefreshToken) => {
///         // No session to refresh; send the user to login
///     }
///     Err(err) => eprintln!("Refresh failed: {err}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AuthError {
    /// The underlying API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A refresh was requested but no refresh token is held.
    #[error("No refresh token available")]
    MissingRefreshToken,

    /// The backend returned a body that does not match the expected shape.
    #[error("Failed to parse authentication response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// Errors that can occur while loading the persisted session.
///
/// Hydration treats every variant the same way: the store stays anonymous.
/// The variants exist so callers can tell an empty store from a corrupted
/// one.
#[derive(Debug, Error)]
pub enum SessionLoadError {
    /// No session record is present in durable storage.
    #[error("No persisted session")]
    Missing,

    /// Durable storage could not be read.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The session record could not be decoded.
    #[error("Failed to decode persisted session: {0}")]
    Decode(#[from] serde_json::Error),

    /// The session record decoded but violates the session invariant
    /// (e.g. marked authenticated without tokens).
    #[error("Persisted session is inconsistent")]
    Inconsistent,
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthError>();
    assert_send_sync::<SessionLoadError>();
};
