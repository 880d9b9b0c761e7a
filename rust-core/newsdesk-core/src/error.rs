//! # Error Handling
//!
//! Infrastructure error types for newsdesk core.
//! Uses `thiserror` for ergonomic error definitions.
//!
//! Client-facing request outcomes live in [`crate::api_error`]; this type
//! covers everything below the HTTP contract (sockets, routing tables,
//! database drivers).

use thiserror::Error;

/// Result type alias for newsdesk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the newsdesk runtime
#[derive(Error, Debug)]
pub enum Error {
    /// Server failed to bind to the specified address
    #[error("Failed to bind server to {address}: {source}")]
    BindError {
        /// The address we tried to bind to
        address: String,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Router failed to match the requested path
    #[error("No route found for path: {path}")]
    RouteNotFound {
        /// The path that wasn't matched
        path: String,
    },

    /// Invalid route pattern provided
    #[error("Invalid route pattern: {pattern}: {reason}")]
    InvalidRoutePattern {
        /// The invalid pattern
        pattern: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Path parameter could not be converted to its declared type
    #[error("Cannot convert '{raw}' to {expected}")]
    ParamConversion {
        /// Raw segment from the request path
        raw: String,
        /// Declared type name
        expected: &'static str,
    },

    /// HTTP protocol error
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {message}")]
    Json {
        /// Parser or serializer message
        message: String,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {message}")]
    Database {
        /// Error message from database
        message: String,
    },

    /// Request payload too large
    #[error("Payload too large: limit={limit} bytes")]
    PayloadTooLarge {
        /// Max allowed size
        limit: usize,
    },
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Database {
            message: format!("Query error: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_not_found_error() {
        let err = Error::RouteNotFound {
            path: "/unknown".to_string(),
        };
        assert!(err.to_string().contains("/unknown"));
    }

    #[test]
    fn test_bind_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let err = Error::BindError {
            address: "0.0.0.0:9090".to_string(),
            source: io_err,
        };
        assert!(err.to_string().contains("0.0.0.0:9090"));
    }

    #[test]
    fn test_sqlx_error_becomes_database_error() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::Database { .. }));
        assert!(err.to_string().starts_with("Database error: Query error"));
    }
}
