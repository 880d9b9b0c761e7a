//! # Route Metadata
//!
//! Per-route information derived from a registered path pattern.

use crate::router::HandlerId;
use crate::types::{parse_param_pattern, ParamType};
use std::collections::HashMap;

/// Route metadata containing handler and parameter type information
#[derive(Debug, Clone)]
pub struct RouteInfo {
    /// Unique handler identifier
    pub handler_id: HandlerId,
    /// Original path pattern (e.g., "/api/articles/{article_id:int}")
    pub path_pattern: String,
    /// Normalized path for matchit (e.g., "/api/articles/{article_id}")
    pub match_pattern: String,
    /// Parameter name to type mapping
    pub param_types: HashMap<String, ParamType>,
}

impl RouteInfo {
    /// Create a new `RouteInfo` from a path pattern
    ///
    /// Parses the pattern to extract parameter types and creates
    /// a normalized pattern for matchit routing.
    #[must_use]
    pub fn new(handler_id: HandlerId, path: &str) -> Self {
        let (match_pattern, param_types) = Self::parse_path_pattern(path);

        Self {
            handler_id,
            path_pattern: path.to_string(),
            match_pattern,
            param_types,
        }
    }

    /// Converts `{name:type}` to `{name}` and collects the declared types.
    fn parse_path_pattern(path: &str) -> (String, HashMap<String, ParamType>) {
        let mut param_types = HashMap::new();
        let mut normalized_parts = Vec::new();

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if let Some((name, param_type)) = parse_param_pattern(segment) {
                normalized_parts.push(format!("{{{name}}}"));
                param_types.insert(name, param_type);
            } else {
                normalized_parts.push(segment.to_string());
            }
        }

        let normalized = if normalized_parts.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", normalized_parts.join("/"))
        };

        (normalized, param_types)
    }

    /// Get the type for a parameter by name
    ///
    /// Returns `ParamType::String` if the parameter was declared without a type.
    #[must_use]
    pub fn get_param_type(&self, name: &str) -> ParamType {
        self.param_types.get(name).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_info_simple() {
        let info = RouteInfo::new(0, "/api/topics");
        assert_eq!(info.match_pattern, "/api/topics");
        assert!(info.param_types.is_empty());
    }

    #[test]
    fn test_route_info_with_typed_param() {
        let info = RouteInfo::new(0, "/api/articles/{article_id:int}");
        assert_eq!(info.match_pattern, "/api/articles/{article_id}");
        assert_eq!(info.get_param_type("article_id"), ParamType::Int);
        assert_eq!(info.path_pattern, "/api/articles/{article_id:int}");
    }

    #[test]
    fn test_route_info_untyped_param() {
        let info = RouteInfo::new(0, "/api/topics/{slug}");
        assert_eq!(info.get_param_type("slug"), ParamType::String);
        assert_eq!(info.get_param_type("missing"), ParamType::String);
    }

    #[test]
    fn test_route_info_root() {
        let info = RouteInfo::new(0, "/");
        assert_eq!(info.match_pattern, "/");
    }
}
