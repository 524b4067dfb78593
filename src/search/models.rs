//! Search request and related data models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Output fidelity of a formatted response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Every field of every item
    #[default]
    Complete,
    /// A fixed per-category subset of fields
    Compact,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Compact => "compact",
        }
    }
}

impl FromStr for ResponseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "complete" => Ok(Self::Complete),
            "compact" => Ok(Self::Compact),
            other => Err(format!(
                "expected one of \"complete\", \"compact\", got {other:?}"
            )),
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated parameters forwarded to the backend.
///
/// Always holds a non-empty `q` and a non-empty `engine`. Every other key is
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SearchParams(Map<String, Value>);

impl SearchParams {
    /// Wrap an already-validated map. Only the request builder calls this.
    pub(crate) fn from_validated(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// The search query
    pub fn query(&self) -> &str {
        self.0.get("q").and_then(Value::as_str).unwrap_or_default()
    }

    /// The engine the backend should run
    pub fn engine(&self) -> &str {
        self.0.get("engine").and_then(Value::as_str).unwrap_or_default()
    }

    /// Look up any parameter
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Flatten into query-string pairs, sorted by key.
    ///
    /// Strings go out verbatim, numbers and booleans as their JSON text,
    /// arrays and objects as compact JSON. Nulls are skipped.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .0
            .iter()
            .filter_map(|(key, value)| {
                let rendered = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    _ => value.to_string(),
                };
                Some((key.clone(), rendered))
            })
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }
}

/// A single search invocation, built once and never mutated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    /// Backend parameters
    pub params: SearchParams,
    /// Output fidelity
    pub mode: ResponseMode,
    /// Skip classification and formatting, returning the backend payload
    pub raw: bool,
}

/// Backend credential resolved by the transport layer
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> SearchParams {
        match value {
            Value::Object(map) => SearchParams::from_validated(map),
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("complete".parse::<ResponseMode>(), Ok(ResponseMode::Complete));
        assert_eq!(" Compact ".parse::<ResponseMode>(), Ok(ResponseMode::Compact));
        assert!("raw".parse::<ResponseMode>().is_err());
        assert_eq!(ResponseMode::default(), ResponseMode::Complete);
    }

    #[test]
    fn test_query_pairs_are_sorted_and_stringified() {
        let params = params(json!({
            "q": "coffee",
            "engine": "google_light",
            "num": 10,
            "no_cache": true,
            "skip": null,
            "tbs": ["qdr:d"]
        }));

        let pairs = params.to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("engine".to_string(), "google_light".to_string()),
                ("no_cache".to_string(), "true".to_string()),
                ("num".to_string(), "10".to_string()),
                ("q".to_string(), "coffee".to_string()),
                ("tbs".to_string(), "[\"qdr:d\"]".to_string()),
            ]
        );
    }

    #[test]
    fn test_accessors() {
        let params = params(json!({"q": "rust", "engine": "bing", "location": "Austin, TX"}));
        assert_eq!(params.query(), "rust");
        assert_eq!(params.engine(), "bing");
        assert_eq!(params.get("location"), Some(&json!("Austin, TX")));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("super-secret");
        assert_eq!(format!("{credential:?}"), "Credential(***)");
        assert_eq!(credential.expose(), "super-secret");
    }
}
