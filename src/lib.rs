//! # AEMS API Rust SDK
//!
//! A Rust client SDK for the AEMS enterprise-management platform API,
//! providing an authenticated HTTP client with transparent token refresh and
//! a persisted auth session store.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`ApiConfig`] and [`ApiConfigBuilder`]
//! - A single shared HTTP gateway ([`ApiClient`]) that attaches the current
//!   access token and a per-request correlation identifier to every call
//! - Single-retry recovery from expired credentials: a 401 triggers exactly
//!   one token refresh and one replay, invisible to the caller when it works
//! - Status-code classification of failures with one user-facing
//!   notification per failed call via the [`notify::Notifier`] seam
//! - A session store ([`AuthStore`]) owning login/logout/refresh state, with
//!   the durable subset persisted through the [`storage::Storage`] seam
//!
//! ## Quick Start
//!
//! ```rust
//! use aems_api::{ApiConfig, BaseUrl};
//!
//! // Create configuration using the builder pattern
//! let config = ApiConfig::builder()
//!     .base_url(BaseUrl::new("http://localhost:8000/api").unwrap())
//!     .user_agent_prefix("MyApp/1.0")
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Composing the Client and Store
//!
//! There is no global state: the application constructs one client and one
//! store and shares them via [`std::sync::Arc`]:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use aems_api::{ApiClient, ApiConfig, AuthStore, BaseUrl};
//! use aems_api::notify::LogNotifier;
//! use aems_api::storage::FileStorage;
//!
//! let config = ApiConfig::builder()
//!     .base_url(BaseUrl::new("https://api.example.com/api").unwrap())
//!     .build()?;
//!
//! let storage = Arc::new(FileStorage::open("session.json")?);
//! let notifier = Arc::new(LogNotifier);
//! let client = Arc::new(ApiClient::new(&config, storage.clone(), notifier));
//! let auth = AuthStore::new(client.clone(), storage, &config);
//!
//! // Restore a previous session, or sign in
//! if !auth.hydrate() {
//!     auth.login("jane@example.com", "secret", true).await?;
//! }
//!
//! // Feature code goes through the shared client
//! let overview = client.get("/dashboard/overview").await?;
//! println!("{}", overview.body);
//! ```
//!
//! ## Token Refresh
//!
//! When any request comes back 401, the client reads the refresh token from
//! durable storage, exchanges it at the refresh endpoint, stores the new
//! access token, and replays the original request once. Concurrent 401s
//! coalesce onto a single refresh call. If the refresh itself fails, the
//! session is torn down and [`notify::Notifier::authentication_required`]
//! fires; the caller sees the refresh error.
//!
//! ## Design Principles
//!
//! - **No global state**: The client and store are instance-based and passed
//!   explicitly
//! - **Fail-fast validation**: Configuration newtypes validate on
//!   construction
//! - **Thread-safe**: All shared types are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio async runtime
//! - **Errors are never swallowed**: Notifications are side effects; the
//!   original error always reaches the caller

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;

// Re-export public types at crate root for convenience
pub use auth::{AuthError, AuthState, AuthStore, AuthTokens, PersistedSession, User, UserUpdate};
pub use config::{ApiConfig, ApiConfigBuilder, BaseUrl, StorageKey};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    ApiClient, ApiError, ApiResponseError, ErrorKind, HttpMethod, HttpRequest, HttpRequestBuilder,
    HttpResponse, RefreshError,
};
