//! Authentication types for the AEMS API SDK.
//!
//! This module provides the auth session store and the records it manages.
//!
//! # Overview
//!
//! - [`AuthStore`]: Owns the session lifecycle (login, logout, refresh,
//!   hydration, user updates)
//! - [`AuthState`]: Snapshot of the in-memory session state
//! - [`User`] / [`UserUpdate`]: The signed-in identity and its partial form
//! - [`AuthTokens`]: The access/refresh token bundle
//! - [`PersistedSession`]: The durable subset that survives restarts
//! - [`endpoints`]: Endpoint paths and wire types for the `/auth/*` API
//!
//! # Session Lifecycle
//!
//! A session is created empty, populated by [`AuthStore::login`], has its
//! tokens replaced in place by [`AuthStore::refresh`], and is reset by
//! [`AuthStore::logout`], whether or not the remote logout call succeeds.
//! The durable subset survives restarts and is restored by
//! [`AuthStore::hydrate`] without contacting the server.
//!
//! # Example
//!
//! ```rust
//! use aems_api::auth::{AuthState, AuthTokens, User};
//!
//! let state = AuthState::default();
//! assert!(!state.is_authenticated);
//! assert!(state.is_consistent());
//! ```

pub mod endpoints;
mod error;
pub mod session;
mod store;

pub use error::{AuthError, SessionLoadError};
pub use session::{AuthState, AuthTokens, PersistedSession, User, UserUpdate};
pub use store::AuthStore;
