//! # Router
//!
//! Radix-trie based router using `matchit`, one trie per HTTP method.
//!
//! ## Features
//!
//! - Path parameter extraction (`/api/articles/{article_id}`)
//! - Typed parameters (`/api/articles/{article_id:int}`)
//! - Percent-encoded segments are decoded before conversion
//! - Unknown method or path reports `Error::RouteNotFound`, which the server
//!   answers with the fallback route

use crate::error::{Error, Result};
use crate::route::RouteInfo;
use crate::types::{convert_param, ParamValue};
use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::collections::HashMap;

/// HTTP methods understood by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP DELETE
    Delete,
    /// HTTP PATCH
    Patch,
    /// HTTP HEAD
    Head,
    /// HTTP OPTIONS
    Options,
    /// Any other method; never routable
    Other,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
            Self::Patch => write!(f, "PATCH"),
            Self::Head => write!(f, "HEAD"),
            Self::Options => write!(f, "OPTIONS"),
            Self::Other => write!(f, "OTHER"),
        }
    }
}

impl From<&hyper::Method> for Method {
    fn from(method: &hyper::Method) -> Self {
        match *method {
            hyper::Method::GET => Self::Get,
            hyper::Method::POST => Self::Post,
            hyper::Method::PUT => Self::Put,
            hyper::Method::DELETE => Self::Delete,
            hyper::Method::PATCH => Self::Patch,
            hyper::Method::HEAD => Self::Head,
            hyper::Method::OPTIONS => Self::Options,
            _ => Self::Other,
        }
    }
}

/// Route handler identifier
pub type HandlerId = usize;

/// Matched route with decoded and converted parameters
#[derive(Debug)]
pub struct Match {
    /// The handler ID for this route
    pub handler_id: HandlerId,
    /// Typed path parameters; failed conversions are kept as strings
    pub typed_params: HashMap<String, ParamValue>,
}

impl Match {
    /// Get a typed parameter by name
    #[must_use]
    pub fn get_typed(&self, name: &str) -> Option<&ParamValue> {
        self.typed_params.get(name)
    }

    /// Get a parameter as i64, `None` if missing or not an integer
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.typed_params.get(name).and_then(ParamValue::as_int)
    }
}

/// Percent-decode a path segment; invalid UTF-8 leaves it untouched
fn decode_segment(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(raw))
}

/// Per-method storage for routes
#[derive(Clone)]
struct MethodRoutes {
    router: MatchitRouter<HandlerId>,
    routes: Vec<RouteInfo>,
}

impl MethodRoutes {
    fn new() -> Self {
        Self {
            router: MatchitRouter::new(),
            routes: Vec::new(),
        }
    }
}

/// HTTP router using a radix trie per method
#[derive(Clone, Default)]
pub struct Router {
    method_routes: HashMap<Method, MethodRoutes>,
    next_handler_id: HandlerId,
}

impl Router {
    /// Create a new empty router
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route with the given method and path pattern
    ///
    /// Handler IDs are assigned sequentially from zero, so they index the
    /// server's handler table in registration order.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRoutePattern` if the pattern is malformed or
    /// conflicts with an existing route for the same method.
    pub fn add_route(&mut self, method: Method, path: &str) -> Result<HandlerId> {
        let handler_id = self.next_handler_id;

        let route_info = RouteInfo::new(handler_id, path);

        let method_routes = self
            .method_routes
            .entry(method)
            .or_insert_with(MethodRoutes::new);

        method_routes
            .router
            .insert(route_info.match_pattern.clone(), handler_id)
            .map_err(|e| Error::InvalidRoutePattern {
                pattern: path.to_string(),
                reason: e.to_string(),
            })?;

        method_routes.routes.push(route_info);
        self.next_handler_id += 1;

        Ok(handler_id)
    }

    /// Match a request path against registered routes
    ///
    /// # Errors
    ///
    /// Returns `Error::RouteNotFound` if no route exists for this method and path
    pub fn match_route(&self, method: Method, path: &str) -> Result<Match> {
        let not_found = || Error::RouteNotFound {
            path: path.to_string(),
        };

        let method_routes = self.method_routes.get(&method).ok_or_else(not_found)?;

        let matched = method_routes.router.at(path).map_err(|_| not_found())?;
        let handler_id = *matched.value;

        let route_info = method_routes
            .routes
            .iter()
            .find(|r| r.handler_id == handler_id)
            .ok_or_else(not_found)?;

        let typed_params = matched
            .params
            .iter()
            .map(|(name, raw)| {
                let value = decode_segment(raw);
                let typed = convert_param(&value, route_info.get_param_type(name))
                    .unwrap_or_else(|_| ParamValue::String(value.into_owned()));
                (name.to_string(), typed)
            })
            .collect();

        Ok(Match {
            handler_id,
            typed_params,
        })
    }
}
