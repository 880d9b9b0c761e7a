//! # Path Parameter Types
//!
//! Conversion of raw path segments into typed values.
//!
//! Route patterns declare a type with a specifier (`{article_id:int}`).
//! Conversion never rejects a route match: a segment that fails to convert is
//! kept as a string so the handler can decide how to answer.

use crate::error::{Error, Result};
use std::fmt;

/// Supported path parameter types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamType {
    /// String type (default) - no conversion
    #[default]
    String,
    /// Integer type - parses to i64
    Int,
}

impl ParamType {
    /// Parse type specifier from route pattern (e.g., "int" from "{id:int}")
    #[must_use]
    pub fn from_specifier(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "int" | "integer" | "i64" => Self::Int,
            _ => Self::String,
        }
    }

    /// Get the type name for error messages
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "integer",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Converted parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// String value (no conversion performed, or conversion failed)
    String(String),
    /// Integer value (i64)
    Int(i64),
}

impl ParamValue {
    /// Get the value as it appeared in the path
    #[must_use]
    pub fn as_string(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Int(i) => i.to_string(),
        }
    }

    /// Get as i64 if Int variant
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::String(_) => None,
        }
    }
}

/// Convert raw string to typed value based on `ParamType`
///
/// # Errors
///
/// Returns `Error::ParamConversion` if the segment does not fit the type.
pub fn convert_param(raw: &str, param_type: ParamType) -> Result<ParamValue> {
    match param_type {
        ParamType::String => Ok(ParamValue::String(raw.to_string())),
        ParamType::Int => raw
            .parse::<i64>()
            .map(ParamValue::Int)
            .map_err(|_| Error::ParamConversion {
                raw: raw.to_string(),
                expected: param_type.type_name(),
            }),
    }
}

/// Parse a path segment pattern to extract name and type
///
/// - `{slug}` -> ("slug", ParamType::String)
/// - `{article_id:int}` -> ("article_id", ParamType::Int)
///
/// Returns `None` for a static segment.
#[must_use]
pub fn parse_param_pattern(segment: &str) -> Option<(String, ParamType)> {
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;

    match inner.split_once(':') {
        Some((name, type_spec)) => Some((name.to_string(), ParamType::from_specifier(type_spec))),
        None => Some((inner.to_string(), ParamType::String)),
    }
}
