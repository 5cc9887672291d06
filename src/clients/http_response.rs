//! HTTP response types for the AEMS API SDK.
//!
//! This module provides the [`HttpResponse`] type for parsing and accessing
//! API response data.

use std::collections::HashMap;

/// An HTTP response from the AEMS backend.
///
/// Contains the response status code, lower-cased headers, and the parsed
/// JSON body. The backend echoes the request's correlation identifier in the
/// `X-Correlation-ID` response header, which [`HttpResponse::correlation_id`]
/// exposes for tracing.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: u16,
    /// Response headers (header names lower-cased; headers may repeat).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Creates a new `HttpResponse` from a status code, headers, and the raw
    /// body text.
    ///
    /// The body is parsed as JSON. An empty body parses to `{}`; a non-JSON
    /// body (some proxies return plain text for 5xx) is preserved under a
    /// `"raw_body"` key so the content is not lost.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, Vec<String>>, body_text: &str) -> Self {
        let body = if body_text.is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(body_text)
                .unwrap_or_else(|_| serde_json::json!({ "raw_body": body_text }))
        };

        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status >= 200 && self.status <= 299
    }

    /// Returns the echoed `X-Correlation-ID` header value, if present.
    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        self.header("x-correlation-id")
    }

    /// Returns the first value of the named header, if present.
    ///
    /// Header names are matched lower-cased.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Deserializes the response body into the requested type.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the body does not match the type.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }
}
