//! HTTP client types for AEMS backend communication.
//!
//! This module provides the single shared gateway used by all feature code
//! to talk to the backend. It handles token attachment, correlation-ID
//! tracing, single-retry recovery from expired credentials, and failure
//! classification.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ApiClient`]: The async HTTP client for backend communication
//! - [`HttpRequest`]: A request to be sent to the backend
//! - [`HttpResponse`]: A parsed response from the backend
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, PATCH, DELETE)
//! - [`ApiError`] / [`ErrorKind`]: Classified failures
//! - [`RefreshError`]: Terminal token-refresh failures
//!
//! # Retry Behavior
//!
//! Each request carries its own one-shot retry allowance:
//!
//! - **401 (Unauthorized)**: Triggers one token refresh followed by one
//!   replay of the original request. A second 401 on the replay is
//!   propagated without another refresh. Concurrent 401s coalesce onto a
//!   single refresh call.
//! - **All other non-2xx statuses**: Returned immediately after
//!   classification and a single user-facing notification.
//!
//! # Example
//!
//! ```rust,ignore
//! use aems_api::clients::{HttpRequest, HttpMethod};
//!
//! let request = HttpRequest::builder(HttpMethod::Get, "/dashboard/overview")
//!     .query_param("timeframe", "30d")
//!     .build();
//!
//! let response = client.request(request).await?;
//! ```

pub mod correlation;
mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use correlation::correlation_id;
pub use errors::{ApiError, ApiResponseError, ErrorKind, RefreshError};
pub use http_client::{ApiClient, CORRELATION_HEADER, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
