//! # JSON Module
//!
//! Request bodies are parsed with simd-json; responses are written with
//! serde_json.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Parse JSON bytes to a typed value using simd-json
///
/// simd-json parses in place, so the input is copied into a scratch buffer
/// and the caller's slice is left untouched.
///
/// # Errors
///
/// Returns `Error::Json` if parsing fails
pub fn parse_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut scratch = bytes.to_vec();
    simd_json::from_slice(&mut scratch).map_err(|e| Error::Json {
        message: format!("Parse error: {e}"),
    })
}

/// Serialize a value to JSON string
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Json {
        message: format!("Serialize error: {e}"),
    })
}
