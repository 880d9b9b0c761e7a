//! # HTTP Response
//!
//! Transport-neutral response built by handlers and middleware, converted to
//! a hyper response at the connection boundary.

use crate::error::Result;
use crate::json::to_json;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::collections::HashMap;

/// Content type for JSON bodies
pub const CONTENT_TYPE_JSON: &str = "application/json";
/// Content type for plain-text error bodies
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// HTTP response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body
    pub body: String,
    /// Content type
    pub content_type: String,
    /// Response headers
    pub headers: HashMap<String, String>,
}

impl Default for ApiResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            body: String::new(),
            content_type: CONTENT_TYPE_JSON.to_string(),
            headers: HashMap::new(),
        }
    }
}

impl ApiResponse {
    /// Create a JSON response from an already encoded body
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Serialize `value` into a 200 JSON response
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails.
    pub fn json_value<T: Serialize>(value: &T) -> Result<Self> {
        to_json(value).map(Self::json)
    }

    /// Create a plain-text response
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: CONTENT_TYPE_TEXT.to_string(),
            ..Self::default()
        }
    }

    /// Set status code
    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Set or override a header
    pub fn set_header(&mut self, key: &str, value: &str) {
        if key.eq_ignore_ascii_case("content-type") {
            self.content_type = value.to_string();
        } else {
            self.headers.insert(key.to_ascii_lowercase(), value.to_string());
        }
    }

    /// Get a header previously set on this response
    #[must_use]
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Convert to hyper Response
    pub(crate) fn into_hyper(self) -> Response<Full<Bytes>> {
        let mut builder = Response::builder()
            .status(self.status)
            .header("Content-Type", &self.content_type);
        for (k, v) in &self.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }

        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|_| plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"))
    }
}

/// Build a bare hyper response for failures that happen before routing
pub(crate) fn plain(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(hyper::header::CONTENT_TYPE, hyper::header::HeaderValue::from_static(CONTENT_TYPE_TEXT));
    response
}
