//! Side-channel notifications for failed API calls.
//!
//! The API client reports failures to the user through a [`Notifier`] rather
//! than through return values alone: every failed call produces exactly one
//! [`Notifier::error`] notification (401s excepted, which stay silent), and a
//! terminal refresh failure produces one [`Notifier::authentication_required`]
//! signal. Errors are still propagated to the caller after the notification
//! side effect runs.
//!
//! Applications embed the SDK by supplying their own implementation: a
//! desktop app might surface [`Notifier::error`] as a toast and
//! [`Notifier::authentication_required`] as navigation to its login screen
//! (skipping the navigation when already there). The SDK ships
//! [`LogNotifier`], which reports both through `tracing`.
//!
//! # Example
//!
//! ```rust
//! use aems_api::notify::{LogNotifier, Notifier};
//! use aems_api::ErrorKind;
//!
//! let notifier = LogNotifier;
//! notifier.error(ErrorKind::Server, "Server error. Please try again later.");
//! ```

use crate::clients::ErrorKind;

/// Receiver for user-facing failure notifications.
///
/// Implementations must be safe to share across threads. The client
/// guarantees at most one `error` call per failed request and at most one
/// `authentication_required` call per failed refresh.
pub trait Notifier: Send + Sync {
    /// Reports a failed API call to the user.
    ///
    /// Called exactly once per failed call, with the classification and a
    /// display-ready message. Never called for 401 responses.
    fn error(&self, kind: ErrorKind, message: &str);

    /// Signals that the session can no longer be recovered and the user must
    /// authenticate again.
    ///
    /// In an interactive application this typically navigates to the login
    /// entry point; the implementation decides whether navigation is needed
    /// (for example, skipping it when the login screen is already showing).
    fn authentication_required(&self);
}

/// [`Notifier`] that reports through `tracing`.
///
/// The default choice for services and tests that have no user-facing
/// surface of their own.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, kind: ErrorKind, message: &str) {
        tracing::warn!(%kind, message, "API call failed");
    }

    fn authentication_required(&self) {
        tracing::warn!("Session expired and could not be refreshed; re-authentication required");
    }
}

// Verify LogNotifier is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<LogNotifier>();
};
