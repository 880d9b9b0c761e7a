//! # HTTP Request
//!
//! Owned request wrapper handed to middleware and handlers.
//!
//! The body is collected once, with the configured size limit enforced both
//! on the declared `Content-Length` and while the bytes are streamed in, so an
//! oversized chunked body is cut off at the limit instead of buffered whole.

use crate::error::{Error, Result};
use crate::router::Method;
use crate::types::ParamValue;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH};
use hyper::Request;
use std::collections::HashMap;
use std::time::Instant;

/// HTTP request with a fully collected body
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Request path (without query string)
    pub path: String,
    /// Typed path parameters, filled in after routing
    pub typed_params: HashMap<String, ParamValue>,
    /// When the request entered the server
    pub received_at: Instant,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl ApiRequest {
    /// Create a request manually (tests and in-process dispatch)
    ///
    /// Any query string on `path` is discarded.
    #[must_use]
    pub fn new(
        method: Method,
        path: impl Into<String>,
        headers_map: HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Self {
        let mut path = path.into();
        if let Some(idx) = path.find('?') {
            path.truncate(idx);
        }

        let mut req = Self {
            method,
            path,
            typed_params: HashMap::new(),
            received_at: Instant::now(),
            headers: HeaderMap::new(),
            body,
        };
        for (k, v) in &headers_map {
            req.set_header(k, v);
        }
        req
    }

    /// Create from a hyper request, collecting at most `max_body_size` bytes
    ///
    /// # Errors
    ///
    /// Returns `Error::PayloadTooLarge` when the declared or received body
    /// exceeds the limit, `Error::Http` when reading the body fails.
    pub async fn from_hyper_with_limit(
        req: Request<hyper::body::Incoming>,
        max_body_size: usize,
    ) -> Result<Self> {
        let received_at = Instant::now();
        let method = Method::from(req.method());
        let path = req.uri().path().to_string();
        let headers = req.headers().clone();

        let declared = headers
            .get(CONTENT_LENGTH)
            .and_then(|len| len.to_str().ok())
            .and_then(|len| len.parse::<usize>().ok());
        if declared.is_some_and(|len| len > max_body_size) {
            return Err(Error::PayloadTooLarge {
                limit: max_body_size,
            });
        }

        let bytes = Limited::new(req.into_body(), max_body_size)
            .collect()
            .await
            .map_err(|err| body_error(err, max_body_size))?
            .to_bytes();
        let body = if bytes.is_empty() { None } else { Some(bytes) };

        Ok(Self {
            method,
            path,
            typed_params: HashMap::new(),
            received_at,
            headers,
            body,
        })
    }

    /// Get a header value by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Set or override a header; invalid names or values are ignored
    pub fn set_header(&mut self, name: &str, value: &str) {
        if let (Ok(n), Ok(v)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(n, v);
        }
    }

    /// Get the request body as bytes
    #[must_use]
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

fn body_error(err: Box<dyn std::error::Error + Send + Sync>, limit: usize) -> Error {
    if err.is::<LengthLimitError>() {
        return Error::PayloadTooLarge { limit };
    }
    match err.downcast::<hyper::Error>() {
        Ok(err) => Error::Http(*err),
        Err(err) => Error::Io(std::io::Error::other(err)),
    }
}
