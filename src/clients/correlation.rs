//! Correlation identifier generation for request tracing.
//!
//! Every outbound request carries a freshly generated `X-Correlation-ID`
//! header so calls can be traced through the backend's logging pipeline. The
//! identifier is not security-relevant; it only needs to be unique within a
//! session.
//!
//! # Format
//!
//! `rust-<unix-millis>-<9 alphanumeric characters>`, e.g.
//! `rust-1712345678901-k3v9x1m2q`. The millisecond timestamp orders
//! identifiers; the random suffix keeps identifiers generated within the
//! same millisecond from colliding.

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the random suffix appended to each correlation identifier.
const SUFFIX_LENGTH: usize = 9;

/// Generates a fresh correlation identifier.
///
/// # Example
///
/// ```rust
/// use aems_api::clients::correlation_id;
///
/// let id = correlation_id();
/// assert!(id.starts_with("rust-"));
/// ```
#[must_use]
pub fn correlation_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LENGTH)
        .map(char::from)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    format!("rust-{}-{}", Utc::now().timestamp_millis(), suffix)
}
