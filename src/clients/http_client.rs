//! HTTP client for AEMS backend communication.
//!
//! This module provides the [`ApiClient`] type: the single shared gateway
//! through which all feature code talks to the backend. The client attaches
//! the held access token and a fresh correlation identifier to every
//! outgoing request, transparently recovers from expired credentials with a
//! single token refresh, and reports all other failures through the
//! [`Notifier`] side channel before propagating them.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::auth::endpoints::{self, RefreshTokenRequest, RefreshTokenResponse};
use crate::clients::correlation;
use crate::clients::errors::{ApiError, ApiResponseError, ErrorKind, RefreshError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{ApiConfig, BaseUrl, StorageKey};
use crate::notify::Notifier;
use crate::storage::Storage;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header carrying the per-request correlation identifier.
pub const CORRELATION_HEADER: &str = "X-Correlation-ID";

/// The held access token plus a generation counter.
///
/// The generation increments on every token change. A request that receives
/// a 401 remembers the generation it attached; if the generation has moved
/// by the time it reaches the refresh gate, another request already
/// refreshed and this one only needs to replay.
#[derive(Debug, Default)]
struct TokenCell {
    token: Option<String>,
    generation: u64,
}

/// HTTP client for making authenticated requests to the AEMS backend.
///
/// The client handles:
/// - Bearer-token attachment for every request while a token is held
/// - A fresh `X-Correlation-ID` header per request
/// - Single-retry recovery from 401 responses via token refresh
/// - Status-code classification and one user-facing notification per failure
///
/// Exactly one instance should exist per application; construct it once and
/// share it via [`Arc`]. There is no global state.
///
/// # Thread Safety
///
/// `ApiClient` is `Send + Sync`, making it safe to share across async tasks.
/// Concurrent requests each carry their own one-shot retry allowance, and
/// concurrent 401s coalesce onto a single refresh call.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use aems_api::{ApiClient, ApiConfig, BaseUrl};
/// use aems_api::notify::LogNotifier;
/// use aems_api::storage::MemoryStorage;
///
/// let config = ApiConfig::builder()
///     .base_url(BaseUrl::new("http://localhost:8000/api").unwrap())
///     .build()
///     .unwrap();
///
/// let client = Arc::new(ApiClient::new(
///     &config,
///     Arc::new(MemoryStorage::new()),
///     Arc::new(LogNotifier),
/// ));
///
/// let response = client.get("/dashboard/overview").await?;
/// ```
pub struct ApiClient {
    /// The internal reqwest HTTP client (carries the request timeout).
    http: reqwest::Client,
    /// Backend base URL.
    base_url: BaseUrl,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
    /// Held access token and its generation counter.
    token: RwLock<TokenCell>,
    /// Serializes refresh attempts so only one is in flight at a time.
    refresh_gate: tokio::sync::Mutex<()>,
    /// Durable storage holding the refresh token.
    storage: Arc<dyn Storage>,
    /// Side channel for user-facing failure notifications.
    notifier: Arc<dyn Notifier>,
    /// Storage key under which the raw refresh token lives.
    refresh_token_key: StorageKey,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

// Verify ApiClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiClient>();
};

impl ApiClient {
    /// Creates a new API client.
    ///
    /// # Arguments
    ///
    /// * `config` - Base URL, timeout, storage keys, and User-Agent prefix
    /// * `storage` - Durable storage holding the refresh token
    /// * `notifier` - Side channel for failure notifications
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS
    /// initialization failure).
    #[must_use]
    pub fn new(
        config: &ApiConfig,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        // Build User-Agent header
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}AEMS API Client v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.timeout())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: config.base_url().clone(),
            default_headers,
            token: RwLock::new(TokenCell::default()),
            refresh_gate: tokio::sync::Mutex::new(()),
            storage,
            notifier,
            refresh_token_key: config.refresh_token_storage_key().clone(),
        }
    }

    /// Returns the backend base URL for this client.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sets the held access token.
    ///
    /// Subsequent requests attach it as a bearer credential.
    pub fn set_auth_token(&self, token: impl Into<String>) {
        let mut cell = self.token_write();
        cell.token = Some(token.into());
        cell.generation += 1;
    }

    /// Clears the held access token.
    ///
    /// Subsequent requests carry no `Authorization` header.
    pub fn remove_auth_token(&self) {
        let mut cell = self.token_write();
        cell.token = None;
        cell.generation += 1;
    }

    /// Returns the currently held access token, if any.
    #[must_use]
    pub fn auth_token(&self) -> Option<String> {
        self.token_read().token.clone()
    }

    /// Sends an HTTP request to the backend.
    ///
    /// Before sending, the held access token (if any) is attached as a
    /// bearer credential and a freshly generated correlation identifier is
    /// attached as `X-Correlation-ID`.
    ///
    /// A 401 response triggers one token refresh followed by one replay of
    /// the original request; a successful recovery is invisible to the
    /// caller. Every other failure is classified by status code, reported
    /// through the [`Notifier`] exactly once (401s stay silent), and then
    /// propagated.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if:
    /// - A non-2xx response is received (`Response`)
    /// - Credentials expired and the token refresh failed (`Refresh`);
    ///   the session has been torn down and re-authentication signalled
    /// - No response was received at all (`Network`), including timeouts
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        // One-shot retry allowance, scoped to this request alone.
        let mut retries_left: u32 = 1;

        loop {
            let (token, generation) = {
                let cell = self.token_read();
                (cell.token.clone(), cell.generation)
            };

            let url = self.base_url.join(&request.path);
            let mut builder = match request.method {
                HttpMethod::Get => self.http.get(&url),
                HttpMethod::Post => self.http.post(&url),
                HttpMethod::Put => self.http.put(&url),
                HttpMethod::Patch => self.http.patch(&url),
                HttpMethod::Delete => self.http.delete(&url),
            };

            for (key, value) in &self.default_headers {
                builder = builder.header(key, value);
            }
            builder = builder.header(CORRELATION_HEADER, correlation::correlation_id());
            if let Some(token) = &token {
                builder = builder.bearer_auth(token);
            }
            if let Some(query) = &request.query {
                builder = builder.query(query);
            }
            if let Some(extra) = &request.extra_headers {
                for (key, value) in extra {
                    builder = builder.header(key, value);
                }
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = match builder.send().await {
                Ok(response) => response,
                Err(err) => {
                    self.notifier
                        .error(ErrorKind::Network, ErrorKind::Network.user_message());
                    return Err(ApiError::Network(err));
                }
            };

            let status = response.status().as_u16();
            let headers = Self::parse_response_headers(response.headers());
            let body_text = response.text().await.unwrap_or_default();
            let response = HttpResponse::new(status, headers, &body_text);

            if response.is_ok() {
                return Ok(response);
            }

            if status == 401 && retries_left > 0 {
                retries_left -= 1;
                self.refresh_access_token(generation).await?;
                continue;
            }

            let kind = ErrorKind::from_status(status);
            let message = Self::failure_message(kind, &response.body);
            if kind.is_notified() {
                self.notifier.error(kind, &message);
            }

            let correlation_id = response
                .body
                .get("correlationId")
                .and_then(serde_json::Value::as_str)
                .map(String::from)
                .or_else(|| response.correlation_id().map(String::from));

            return Err(ApiError::Response(ApiResponseError {
                status,
                kind,
                message,
                correlation_id,
            }));
        }
    }

    /// Sends a GET request to `path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get(&self, path: &str) -> Result<HttpResponse, ApiError> {
        self.request(HttpRequest::builder(HttpMethod::Get, path).build())
            .await
    }

    /// Sends a POST request to `path` with an optional JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse, ApiError> {
        let mut builder = HttpRequest::builder(HttpMethod::Post, path);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        self.request(builder.build()).await
    }

    /// Sends a PUT request to `path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn put(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<HttpResponse, ApiError> {
        self.request(HttpRequest::builder(HttpMethod::Put, path).body(body).build())
            .await
    }

    /// Sends a PATCH request to `path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn patch(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<HttpResponse, ApiError> {
        self.request(
            HttpRequest::builder(HttpMethod::Patch, path)
                .body(body)
                .build(),
        )
        .await
    }

    /// Sends a DELETE request to `path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete(&self, path: &str) -> Result<HttpResponse, ApiError> {
        self.request(HttpRequest::builder(HttpMethod::Delete, path).build())
            .await
    }

    /// Refreshes the held access token, coalescing concurrent attempts.
    ///
    /// `observed_generation` is the token generation the failing request
    /// attached. Attempts serialize on the refresh gate; once inside, a
    /// moved generation means another request already refreshed and this
    /// one can replay immediately. At most one refresh call is therefore in
    /// flight at any time.
    ///
    /// On any failure the session is torn down: the held token is cleared,
    /// the durable refresh token is removed, and re-authentication is
    /// signalled through the notifier.
    async fn refresh_access_token(&self, observed_generation: u64) -> Result<(), RefreshError> {
        let _gate = self.refresh_gate.lock().await;

        if self.token_read().generation != observed_generation {
            tracing::debug!("Access token already refreshed by a concurrent request");
            return Ok(());
        }

        match self.try_refresh().await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.teardown_session();
                Err(err)
            }
        }
    }

    /// Performs one refresh call against the refresh endpoint.
    async fn try_refresh(&self) -> Result<(), RefreshError> {
        let refresh_token = self
            .stored_refresh_token()
            .ok_or(RefreshError::MissingRefreshToken)?;

        tracing::debug!("Refreshing access token");

        let url = self.base_url.join(endpoints::REFRESH_PATH);
        let response = self
            .http
            .post(&url)
            .header(CORRELATION_HEADER, correlation::correlation_id())
            .json(&RefreshTokenRequest { refresh_token })
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RefreshError::Refused { status, message });
        }

        let body = response.text().await.unwrap_or_default();
        let tokens: RefreshTokenResponse = serde_json::from_str(&body)?;

        self.set_auth_token(tokens.access_token);
        self.store_refresh_token(&tokens.refresh_token);

        Ok(())
    }

    /// Clears all credential state and signals re-authentication.
    fn teardown_session(&self) {
        self.remove_auth_token();
        if let Err(err) = self.storage.remove(self.refresh_token_key.as_ref()) {
            tracing::warn!(error = %err, "Failed to remove stored refresh token");
        }
        self.notifier.authentication_required();
    }

    /// Reads the refresh token from durable storage, best-effort.
    fn stored_refresh_token(&self) -> Option<String> {
        match self.storage.get(self.refresh_token_key.as_ref()) {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read stored refresh token");
                None
            }
        }
    }

    /// Writes the rotated refresh token to durable storage, best-effort.
    fn store_refresh_token(&self, refresh_token: &str) {
        if let Err(err) = self
            .storage
            .set(self.refresh_token_key.as_ref(), refresh_token)
        {
            tracing::warn!(error = %err, "Failed to persist rotated refresh token");
        }
    }

    /// Builds the failure message for a classified response.
    ///
    /// Prefers the backend's `message` field, falling back to the kind's
    /// canonical text.
    fn failure_message(kind: ErrorKind, body: &serde_json::Value) -> String {
        body.get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|message| !message.is_empty())
            .map_or_else(|| kind.user_message().to_string(), String::from)
    }

    /// Parses response headers into a lower-cased multimap.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    fn token_read(&self) -> RwLockReadGuard<'_, TokenCell> {
        self.token.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn token_write(&self) -> RwLockWriteGuard<'_, TokenCell> {
        self.token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
