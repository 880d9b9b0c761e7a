//! # Validation Module
//!
//! Boundary checks run before any store call. A failure here means the
//! store is never touched.

use crate::api_error::{ApiError, ApiResult};
use crate::json::parse_json_bytes;
use crate::models::{MAX_VOTES, MIN_VOTES};
use crate::types::ParamValue;
use serde_json::Value;
use std::fmt;

/// Name of the vote delta field in `PATCH /api/articles/{id}` bodies
pub const INC_VOTES_FIELD: &str = "inc_votes";

/// A validated, positive article identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArticleId(i64);

impl ArticleId {
    /// Validate a raw path segment
    ///
    /// # Errors
    ///
    /// `ApiError::InvalidInput` unless `raw` is an integer greater than zero.
    pub fn parse(raw: &str) -> ApiResult<Self> {
        match raw.parse::<i64>() {
            Ok(id) => Self::new(id),
            Err(_) => Err(ApiError::InvalidInput),
        }
    }

    /// Validate a typed path parameter as produced by the router
    ///
    /// # Errors
    ///
    /// `ApiError::InvalidInput` for a non-integer or non-positive value.
    pub fn from_param(param: Option<&ParamValue>) -> ApiResult<Self> {
        match param {
            Some(ParamValue::Int(id)) => Self::new(*id),
            Some(ParamValue::String(raw)) => Self::parse(raw),
            None => Err(ApiError::InvalidInput),
        }
    }

    /// Validate an already-numeric id
    ///
    /// # Errors
    ///
    /// `ApiError::InvalidInput` when `id <= 0`.
    pub const fn new(id: i64) -> ApiResult<Self> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(ApiError::InvalidInput)
        }
    }

    /// The numeric id
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signed vote delta taken from a request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteIncrement(i64);

impl VoteIncrement {
    /// Extract `inc_votes` from a JSON request body
    ///
    /// Accepts only a JSON object whose `inc_votes` is an integral number in
    /// the vote tally range. Other fields are ignored.
    ///
    /// # Errors
    ///
    /// `ApiError::BadRequest` for an empty or malformed body, a missing field,
    /// a value that is not an integer, or one outside `MIN_VOTES..=MAX_VOTES`.
    pub fn from_body(body: Option<&[u8]>) -> ApiResult<Self> {
        let body = body.ok_or(ApiError::BadRequest)?;
        let value: Value = parse_json_bytes(body).map_err(|_| ApiError::BadRequest)?;

        value
            .get(INC_VOTES_FIELD)
            .and_then(Value::as_i64)
            .filter(|inc| (MIN_VOTES..=MAX_VOTES).contains(inc))
            .map(Self)
            .ok_or(ApiError::BadRequest)
    }

    /// The delta, possibly negative
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}
