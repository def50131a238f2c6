//! Route-pattern matching compatible with the router's path grammar.
//!
//! Supported syntax, one construct per `/`-separated segment:
//! - literal segments (`/workloads`), matched case-insensitively
//! - named parameters (`/crd/:group/:name`), matching any single segment value
//! - optional parameters (`/crd/:group?`), which may be absent
//! - a wildcard segment (`/extension/*`), matching any remainder
//!
//! A non-exact pattern also matches deeper locations that start with it at a
//! segment boundary (`/workloads` matches `/workloads/pods` but not
//! `/workloadsx`). An exact pattern must match the whole path, allowing one
//! trailing slash.

use std::{
    collections::HashMap,
    sync::Mutex,
};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Error surfaced when a route pattern cannot be compiled.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoutePatternError {
    /// A `:` parameter segment without a name.
    #[error("route pattern '{pattern}' has an unnamed parameter")]
    UnnamedParameter { pattern: String },
    /// A parameter name containing characters other than `[A-Za-z0-9_]`.
    #[error("route pattern '{pattern}' has an invalid parameter name '{name}'")]
    InvalidParameterName { pattern: String, name: String },
    /// The same parameter name appears twice.
    #[error("route pattern '{pattern}' repeats parameter '{name}'")]
    DuplicateParameter { pattern: String, name: String },
    /// The generated expression was rejected by the regex engine.
    #[error("route pattern '{pattern}' failed to compile: {message}")]
    Regex { pattern: String, message: String },
}

/// Parameters captured by a successful match, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMatch {
    pub params: HashMap<String, String>,
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    path: String,
    exact: bool,
    regex: Regex,
    param_names: Vec<String>,
}

static COMPILED_PATTERNS: Lazy<Mutex<HashMap<(String, bool), RoutePattern>>> = Lazy::new(|| Mutex::new(HashMap::new()));

impl RoutePattern {
    /// Compiles `path`, reusing a previously compiled pattern when available.
    pub fn new(path: &str, exact: bool) -> Result<Self, RoutePatternError> {
        let key = (path.to_string(), exact);
        if let Ok(cache) = COMPILED_PATTERNS.lock()
            && let Some(pattern) = cache.get(&key)
        {
            return Ok(pattern.clone());
        }
        let pattern = Self::compile(path, exact)?;
        if let Ok(mut cache) = COMPILED_PATTERNS.lock() {
            cache.insert(key, pattern.clone());
        }
        Ok(pattern)
    }

    fn compile(path: &str, exact: bool) -> Result<Self, RoutePatternError> {
        let mut source = String::from("(?i)^");
        let mut param_names: Vec<String> = Vec::new();

        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            if segment == "*" {
                source.push_str("(?:/.*)?");
                continue;
            }
            let Some(raw_name) = segment.strip_prefix(':') else {
                source.push('/');
                source.push_str(&regex::escape(segment));
                continue;
            };
            let (name, optional) = match raw_name.strip_suffix('?') {
                Some(name) => (name, true),
                None => (raw_name, false),
            };
            if name.is_empty() {
                return Err(RoutePatternError::UnnamedParameter { pattern: path.to_string() });
            }
            if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(RoutePatternError::InvalidParameterName {
                    pattern: path.to_string(),
                    name: name.to_string(),
                });
            }
            if param_names.iter().any(|existing| existing == name) {
                return Err(RoutePatternError::DuplicateParameter {
                    pattern: path.to_string(),
                    name: name.to_string(),
                });
            }
            if optional {
                source.push_str(&format!("(?:/(?P<{name}>[^/]+))?"));
            } else {
                source.push_str(&format!("/(?P<{name}>[^/]+)"));
            }
            param_names.push(name.to_string());
        }

        if exact {
            source.push_str("/?$");
        } else {
            source.push_str("(?:/.*)?$");
        }

        let regex = Regex::new(&source).map_err(|error| RoutePatternError::Regex {
            pattern: path.to_string(),
            message: error.to_string(),
        })?;

        Ok(Self {
            path: path.to_string(),
            exact,
            regex,
            param_names,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// Returns whether `location_path` is matched by this pattern.
    pub fn is_match(&self, location_path: &str) -> bool {
        self.regex.is_match(strip_query(location_path))
    }

    /// Matches `location_path` and returns the captured parameters.
    pub fn match_path(&self, location_path: &str) -> Option<RouteMatch> {
        let captures = self.regex.captures(strip_query(location_path))?;
        let params = self
            .param_names
            .iter()
            .filter_map(|name| captures.name(name).map(|value| (name.clone(), value.as_str().to_string())))
            .collect();
        Some(RouteMatch { params })
    }

    /// Fills the parameters of this pattern from `params`, dropping optional
    /// parameters that have no value.
    ///
    /// Returns `None` when a required parameter is missing.
    pub fn to_path(&self, params: &HashMap<String, String>) -> Option<String> {
        let mut path = String::new();
        for segment in self.path.split('/').filter(|segment| !segment.is_empty()) {
            match segment.strip_prefix(':') {
                Some(raw_name) => {
                    let (name, optional) = match raw_name.strip_suffix('?') {
                        Some(name) => (name, true),
                        None => (raw_name, false),
                    };
                    match params.get(name) {
                        Some(value) => {
                            path.push('/');
                            path.push_str(value);
                        }
                        None if optional => {}
                        None => return None,
                    }
                }
                None if segment == "*" => {}
                None => {
                    path.push('/');
                    path.push_str(segment);
                }
            }
        }
        if path.is_empty() {
            path.push('/');
        }
        Some(path)
    }
}

fn strip_query(location_path: &str) -> &str {
    let end = location_path.find(['?', '#']).unwrap_or(location_path.len());
    &location_path[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_pattern_matches_at_segment_boundaries() {
        let pattern = RoutePattern::new("/workloads", false).expect("compile");
        assert!(pattern.is_match("/workloads"));
        assert!(pattern.is_match("/workloads/"));
        assert!(pattern.is_match("/workloads/pods"));
        assert!(pattern.is_match("/Workloads"));
        assert!(!pattern.is_match("/workloadsx"));
        assert!(!pattern.is_match("/config"));
    }

    #[test]
    fn exact_pattern_rejects_deeper_locations() {
        let pattern = RoutePattern::new("/crd/definitions", true).expect("compile");
        assert!(pattern.is_match("/crd/definitions"));
        assert!(pattern.is_match("/crd/definitions/"));
        assert!(!pattern.is_match("/crd/definitions/extra"));
    }

    #[test]
    fn parameters_match_any_segment_value() {
        let pattern = RoutePattern::new("/crd/:group/:name", true).expect("compile");
        let matched = pattern.match_path("/crd/cert-manager.io/certificates").expect("match");
        assert_eq!(matched.params.get("group").map(String::as_str), Some("cert-manager.io"));
        assert_eq!(matched.params.get("name").map(String::as_str), Some("certificates"));
        assert!(!pattern.is_match("/crd/cert-manager.io"));
    }

    #[test]
    fn optional_parameters_may_be_absent() {
        let pattern = RoutePattern::new("/extension/:name/:page?", true).expect("compile");
        assert!(pattern.is_match("/extension/acme-metrics"));
        assert!(pattern.is_match("/extension/acme-metrics/overview"));
        let matched = pattern.match_path("/extension/acme-metrics").expect("match");
        assert!(!matched.params.contains_key("page"));
    }

    #[test]
    fn query_and_fragment_are_ignored() {
        let pattern = RoutePattern::new("/events", true).expect("compile");
        assert!(pattern.is_match("/events?namespaces=default#top"));
    }

    #[test]
    fn wildcard_matches_any_remainder() {
        let pattern = RoutePattern::new("/extension/*", true).expect("compile");
        assert!(pattern.is_match("/extension"));
        assert!(pattern.is_match("/extension/a/b/c"));
    }

    #[test]
    fn root_pattern_matches_everything_unless_exact() {
        assert!(RoutePattern::new("/", false).expect("compile").is_match("/cluster"));
        let exact = RoutePattern::new("/", true).expect("compile");
        assert!(exact.is_match("/"));
        assert!(!exact.is_match("/cluster"));
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        assert!(matches!(
            RoutePattern::new("/crd/:", false),
            Err(RoutePatternError::UnnamedParameter { .. })
        ));
        assert!(matches!(
            RoutePattern::new("/crd/:gr-oup", false),
            Err(RoutePatternError::InvalidParameterName { .. })
        ));
        assert!(matches!(
            RoutePattern::new("/crd/:group/:group", false),
            Err(RoutePatternError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn to_path_fills_parameters() {
        let pattern = RoutePattern::new("/crd/:group/:name?", false).expect("compile");
        let mut params = HashMap::new();
        params.insert("group".to_string(), "acme.io".to_string());
        assert_eq!(pattern.to_path(&params).as_deref(), Some("/crd/acme.io"));
        params.insert("name".to_string(), "widgets".to_string());
        assert_eq!(pattern.to_path(&params).as_deref(), Some("/crd/acme.io/widgets"));
        assert_eq!(pattern.to_path(&HashMap::new()), None);
    }
}
