//! Configuration types for the AEMS API SDK.
//!
//! This module provides the core configuration types used to initialize
//! the SDK for communication with an AEMS backend.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ApiConfig`]: The main configuration struct holding all SDK settings
//! - [`ApiConfigBuilder`]: A builder for constructing [`ApiConfig`] instances
//! - [`BaseUrl`]: A validated API base URL newtype
//! - [`StorageKey`]: A validated durable-storage key newtype
//!
//! # Example
//!
//! ```rust
//! use aems_api::{ApiConfig, BaseUrl};
//!
//! let config = ApiConfig::builder()
//!     .base_url(BaseUrl::new("https://api.example.com/api").unwrap())
//!     .user_agent_prefix("MyApp/1.0")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.timeout(), std::time::Duration::from_secs(30));
//! ```

mod newtypes;

pub use newtypes::{BaseUrl, StorageKey};

use crate::error::ConfigError;
use std::time::Duration;

/// Default request timeout, after which a call is treated as a network error.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default storage key for the persisted session record.
pub const DEFAULT_SESSION_STORAGE_KEY: &str = "aems_auth_state";

/// Default storage key for the raw refresh-token string.
pub const DEFAULT_REFRESH_TOKEN_STORAGE_KEY: &str = "aems_refresh_token";

/// Configuration for the AEMS API SDK.
///
/// This struct holds all configuration needed for SDK operations: the backend
/// base URL, the request timeout, and the durable-storage keys under which
/// session state is persisted.
///
/// # Thread Safety
///
/// `ApiConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Example
///
/// ```rust
/// use aems_api::{ApiConfig, BaseUrl};
/// use std::time::Duration;
///
/// let config = ApiConfig::builder()
///     .base_url(BaseUrl::new("http://localhost:8000/api").unwrap())
///     .timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.base_url().as_ref(), "http://localhost:8000/api");
/// ```
#[derive(Clone, Debug)]
pub struct ApiConfig {
    base_url: BaseUrl,
    timeout: Duration,
    session_storage_key: StorageKey,
    refresh_token_storage_key: StorageKey,
    user_agent_prefix: Option<String>,
}

impl ApiConfig {
    /// Creates a new builder for constructing an `ApiConfig`.
    #[must_use]
    pub fn builder() -> ApiConfigBuilder {
        ApiConfigBuilder::new()
    }

    /// Returns the backend base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the storage key for the persisted session record.
    #[must_use]
    pub const fn session_storage_key(&self) -> &StorageKey {
        &self.session_storage_key
    }

    /// Returns the storage key for the raw refresh-token string.
    #[must_use]
    pub const fn refresh_token_storage_key(&self) -> &StorageKey {
        &self.refresh_token_storage_key
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify ApiConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiConfig>();
};

/// Builder for constructing [`ApiConfig`] instances.
///
/// This builder provides a fluent API for configuring the SDK. The only
/// required field is `base_url`. All other fields have sensible defaults.
///
/// # Defaults
///
/// - `timeout`: 30 seconds
/// - `session_storage_key`: `aems_auth_state`
/// - `refresh_token_storage_key`: `aems_refresh_token`
/// - `user_agent_prefix`: `None`
///
/// # Example
///
/// ```rust
/// use aems_api::{ApiConfig, BaseUrl, StorageKey};
///
/// let config = ApiConfig::builder()
///     .base_url(BaseUrl::new("https://api.example.com/api").unwrap())
///     .session_storage_key(StorageKey::new("myapp_session").unwrap())
///     .refresh_token_storage_key(StorageKey::new("myapp_refresh").unwrap())
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct ApiConfigBuilder {
    base_url: Option<BaseUrl>,
    timeout: Option<Duration>,
    session_storage_key: Option<StorageKey>,
    refresh_token_storage_key: Option<StorageKey>,
    user_agent_prefix: Option<String>,
}

impl ApiConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend base URL (required).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the storage key for the persisted session record.
    #[must_use]
    pub fn session_storage_key(mut self, key: StorageKey) -> Self {
        self.session_storage_key = Some(key);
        self
    }

    /// Sets the storage key for the raw refresh-token string.
    #[must_use]
    pub fn refresh_token_storage_key(mut self, key: StorageKey) -> Self {
        self.refresh_token_storage_key = Some(key);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ApiConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_url` is not set.
    pub fn build(self) -> Result<ApiConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;

        let session_storage_key = match self.session_storage_key {
            Some(key) => key,
            None => StorageKey::new(DEFAULT_SESSION_STORAGE_KEY)?,
        };
        let refresh_token_storage_key = match self.refresh_token_storage_key {
            Some(key) => key,
            None => StorageKey::new(DEFAULT_REFRESH_TOKEN_STORAGE_KEY)?,
        };

        Ok(ApiConfig {
            base_url,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            session_storage_key,
            refresh_token_storage_key,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ApiConfigBuilder::new().build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "base_url" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = ApiConfig::builder()
            .base_url(BaseUrl::new("https://api.example.com").unwrap())
            .build()
            .unwrap();

        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(
            config.session_storage_key().as_ref(),
            DEFAULT_SESSION_STORAGE_KEY
        );
        assert_eq!(
            config.refresh_token_storage_key().as_ref(),
            DEFAULT_REFRESH_TOKEN_STORAGE_KEY
        );
        assert!(config.user_agent_prefix().is_none());
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let config = ApiConfig::builder()
            .base_url(BaseUrl::new("http://localhost:8000/api").unwrap())
            .timeout(Duration::from_secs(5))
            .session_storage_key(StorageKey::new("custom_session").unwrap())
            .refresh_token_storage_key(StorageKey::new("custom_refresh").unwrap())
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();

        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.session_storage_key().as_ref(), "custom_session");
        assert_eq!(config.refresh_token_storage_key().as_ref(), "custom_refresh");
        assert_eq!(config.user_agent_prefix(), Some("MyApp/1.0"));
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiConfig>();
    }

    #[test]
    fn test_config_is_clone_and_debug() {
        let config = ApiConfig::builder()
            .base_url(BaseUrl::new("https://api.example.com").unwrap())
            .build()
            .unwrap();

        let cloned = config.clone();
        assert_eq!(cloned.base_url(), config.base_url());

        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("ApiConfig"));
    }
}
