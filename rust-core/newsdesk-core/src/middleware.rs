//! # Middleware System
//!
//! Request/response interception around route handlers.
//!
//! Middlewares run in registration order before the handler and in reverse
//! order after it. The fallback route also passes through the chain, so
//! unmatched paths are logged like any other request.

use crate::request::ApiRequest;
use crate::response::ApiResponse;
use crate::server::REQUEST_ID_HEADER;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Middleware trait for request/response interception
pub trait Middleware: Send + Sync {
    /// Called before the request handler
    fn before_request(&self, _req: &ApiRequest) {}

    /// Called after the request handler
    fn after_response(&self, _req: &ApiRequest, _res: &mut ApiResponse) {}

    /// Middleware name for logging
    fn name(&self) -> &'static str {
        "Unknown"
    }
}

/// Ordered middleware chain
#[derive(Default, Clone)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    /// Create a new empty middleware chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a middleware to the chain
    pub fn add<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Arc::new(middleware));
    }

    /// Execute `before_request` for all middlewares
    pub fn run_before(&self, req: &ApiRequest) {
        for mw in &self.middlewares {
            mw.before_request(req);
        }
    }

    /// Execute `after_response` for all middlewares (in reverse order)
    pub fn run_after(&self, req: &ApiRequest, res: &mut ApiResponse) {
        for mw in self.middlewares.iter().rev() {
            mw.after_response(req, res);
        }
    }
}

/// Logs each request and its response status
#[derive(Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    /// Create a new logging middleware
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Middleware for LoggingMiddleware {
    fn before_request(&self, req: &ApiRequest) {
        info!(
            method = %req.method,
            path = %req.path,
            request_id = req.header(REQUEST_ID_HEADER).unwrap_or("-"),
            "Request received"
        );
    }

    fn after_response(&self, req: &ApiRequest, res: &mut ApiResponse) {
        let request_id = req.header(REQUEST_ID_HEADER).unwrap_or("-");
        if res.status.is_server_error() {
            warn!(
                method = %req.method,
                path = %req.path,
                status = res.status.as_u16(),
                request_id,
                "Response sent"
            );
        } else {
            info!(
                method = %req.method,
                path = %req.path,
                status = res.status.as_u16(),
                request_id,
                "Response sent"
            );
        }
    }

    fn name(&self) -> &'static str {
        "LoggingMiddleware"
    }
}

/// Measures request duration from the moment the request was read
#[derive(Default)]
pub struct TimingMiddleware;

impl TimingMiddleware {
    /// Create a new timing middleware
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Middleware for TimingMiddleware {
    fn after_response(&self, req: &ApiRequest, res: &mut ApiResponse) {
        debug!(
            method = %req.method,
            path = %req.path,
            status = res.status.as_u16(),
            duration_ms = %req.received_at.elapsed().as_millis(),
            "Request timing"
        );
    }

    fn name(&self) -> &'static str {
        "TimingMiddleware"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Method;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Records every hook call so ordering is observable
    struct Recorder {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for Recorder {
        fn before_request(&self, _req: &ApiRequest) {
            self.log.lock().unwrap().push(format!("before:{}", self.tag));
        }

        fn after_response(&self, _req: &ApiRequest, _res: &mut ApiResponse) {
            self.log.lock().unwrap().push(format!("after:{}", self.tag));
        }
    }

    fn request() -> ApiRequest {
        ApiRequest::new(Method::Get, "/api/topics", HashMap::new(), None)
    }

    #[test]
    fn test_names() {
        let log = Arc::default();
        assert_eq!(LoggingMiddleware::new().name(), "LoggingMiddleware");
        assert_eq!(TimingMiddleware::new().name(), "TimingMiddleware");
        assert_eq!(Recorder { tag: "a", log }.name(), "Unknown");
    }

    #[test]
    fn test_before_in_order_after_in_reverse() {
        let log: Arc<Mutex<Vec<String>>> = Arc::default();
        let mut chain = MiddlewareChain::new();
        chain.add(Recorder { tag: "a", log: Arc::clone(&log) });
        chain.add(Recorder { tag: "b", log: Arc::clone(&log) });

        let req = request();
        let mut resp = ApiResponse::json("{}");
        chain.run_before(&req);
        chain.run_after(&req, &mut resp);

        assert_eq!(
            *log.lock().unwrap(),
            ["before:a", "before:b", "after:b", "after:a"]
        );
    }

    #[test]
    fn test_builtin_middleware_leaves_response_alone() {
        let mut chain = MiddlewareChain::new();
        chain.add(LoggingMiddleware::new());
        chain.add(TimingMiddleware::new());

        let req = request();
        let mut resp = ApiResponse::json("{}");
        chain.run_before(&req);
        chain.run_after(&req, &mut resp);

        assert_eq!(resp.body, "{}");
        assert!(resp.headers.is_empty());
    }
}
