//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use std::fmt;

/// A validated API base URL.
///
/// This newtype ensures the base URL has an http or https scheme and a host,
/// and normalizes it by trimming any trailing slash so request paths can be
/// appended directly.
///
/// # Accepted Formats
///
/// - `https://api.example.com` - used as-is
/// - `https://api.example.com/api/` - trailing slash trimmed
/// - `http://localhost:8000/api` - plain http is accepted for local development
///
/// # Example
///
/// ```rust
/// use aems_api::BaseUrl;
///
/// let url = BaseUrl::new("https://api.example.com/api/").unwrap();
/// assert_eq!(url.as_ref(), "https://api.example.com/api");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL does not start with
    /// `http://` or `https://`, or has no host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().trim_end_matches('/').to_string();

        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"));

        let valid = rest.is_some_and(|rest| {
            let host = rest.split('/').next().unwrap_or_default();
            !host.is_empty()
        });

        if !valid {
            return Err(ConfigError::InvalidBaseUrl { url });
        }

        Ok(Self(url))
    }

    /// Joins a request path onto this base URL.
    ///
    /// The path may be given with or without a leading slash.
    ///
    /// # Example
    ///
    /// ```rust
    /// use aems_api::BaseUrl;
    ///
    /// let url = BaseUrl::new("http://localhost:8000/api").unwrap();
    /// assert_eq!(url.join("/auth/login"), "http://localhost:8000/api/auth/login");
    /// assert_eq!(url.join("auth/login"), "http://localhost:8000/api/auth/login");
    /// ```
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated durable-storage key.
///
/// Storage keys namespace the SDK's persisted values (the session record and
/// the raw refresh token) inside whatever key/value store the application
/// provides. The only requirement is that they are non-empty.
///
/// # Example
///
/// ```rust
/// use aems_api::StorageKey;
///
/// let key = StorageKey::new("aems_auth_state").unwrap();
/// assert_eq!(key.as_ref(), "aems_auth_state");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKey(String);

impl StorageKey {
    /// Creates a new validated storage key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyStorageKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
