//! # API Errors
//!
//! Every way a request can fail, and the single mapping from failure to
//! status code and plain-text body.

use crate::response::ApiResponse;
use hyper::StatusCode;
use std::fmt;
use thiserror::Error;
use tracing::error;

/// Entity kinds that can be looked up by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// An article
    Article,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Article => f.write_str("Article"),
        }
    }
}

/// Failure outcome of an API operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Path parameter is not a positive integer id
    #[error("Invalid id")]
    InvalidInput,

    /// Request body fails validation
    #[error("Bad request - invalid input")]
    BadRequest,

    /// Input was valid but no such entity exists
    #[error("{0} not found")]
    NotFound(Entity),

    /// No route matches the request
    #[error("Path not found")]
    PathNotFound,

    /// A collaborator failed unexpectedly
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Status code this failure is reported with
    ///
    /// `BadRequest` answers 404, not 400; existing clients depend on it.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::BadRequest | Self::NotFound(_) | Self::PathNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body sent to the client; internal details are never included
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Convert into the plain-text response sent to the client
    #[must_use]
    pub fn into_response(self) -> ApiResponse {
        if let Self::Internal(detail) = &self {
            error!(error = %detail, "request failed");
        }
        ApiResponse::text(self.client_message()).with_status(self.status())
    }
}

impl From<crate::error::Error> for ApiError {
    fn from(err: crate::error::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result of an API operation
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::CONTENT_TYPE_TEXT;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::InvalidInput.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::BadRequest.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::NotFound(Entity::Article).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::PathNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ApiError::InvalidInput.to_string(), "Invalid id");
        assert_eq!(ApiError::BadRequest.to_string(), "Bad request - invalid input");
        assert_eq!(ApiError::NotFound(Entity::Article).to_string(), "Article not found");
        assert_eq!(ApiError::PathNotFound.to_string(), "Path not found");
    }

    #[test]
    fn test_into_response_is_plain_text() {
        let resp = ApiError::NotFound(Entity::Article).into_response();
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
        assert_eq!(resp.body, "Article not found");
        assert_eq!(resp.content_type, CONTENT_TYPE_TEXT);
    }

    #[test]
    fn test_internal_detail_hidden() {
        let err: ApiError = crate::error::Error::Database {
            message: "connection refused".into(),
        }
        .into();
        assert_eq!(err, ApiError::Internal("Database error: connection refused".into()));

        let resp = err.into_response();
        assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.body, "Internal server error");
    }
}
