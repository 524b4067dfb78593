//! Request building
//!
//! Turns the caller's tool arguments into a validated [`SearchRequest`]:
//! - `params.q` must be a non-empty string
//! - `params.engine` falls back to the configured default
//! - `mode` must be `complete` or `compact` when present
//! - every other parameter is passed through as-is

use crate::error::{Result, SearchError};
use crate::search::{ResponseMode, SearchParams, SearchRequest};
use serde_json::{Map, Value};

/// Builds search requests from raw tool arguments
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    default_engine: String,
}

impl RequestBuilder {
    /// Create a builder that fills in `default_engine` when none is given
    pub fn new(default_engine: impl Into<String>) -> Self {
        Self {
            default_engine: default_engine.into(),
        }
    }

    pub fn default_engine(&self) -> &str {
        &self.default_engine
    }

    /// Validate and normalize tool arguments.
    ///
    /// Accepts `{params?: {...}, mode?: "complete" | "compact", raw?: bool}`.
    /// A missing `arguments` value is treated as an empty object so that the
    /// failure names `q` rather than the envelope.
    pub fn build(&self, arguments: &Value) -> Result<SearchRequest> {
        let envelope = match arguments {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            _ => return Err(SearchError::validation("arguments", "must be an object")),
        };

        let mut params = match envelope.get("params") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return Err(SearchError::validation("params", "must be an object")),
        };

        match params.get("q") {
            Some(Value::String(q)) if !q.trim().is_empty() => {}
            Some(Value::String(_)) => {
                return Err(SearchError::validation("q", "must not be empty"));
            }
            Some(_) => return Err(SearchError::validation("q", "must be a string")),
            None => return Err(SearchError::validation("q", "is required")),
        }

        let engine_missing = match params.get("engine") {
            None | Some(Value::Null) => true,
            Some(Value::String(engine)) => engine.trim().is_empty(),
            Some(_) => return Err(SearchError::validation("engine", "must be a string")),
        };
        if engine_missing {
            params.insert(
                "engine".to_string(),
                Value::String(self.default_engine.clone()),
            );
        }

        // The credential travels separately; never forward a caller-supplied one.
        params.remove("api_key");

        let mode = match envelope.get("mode") {
            None | Some(Value::Null) => ResponseMode::default(),
            Some(Value::String(mode)) => mode
                .parse()
                .map_err(|message: String| SearchError::validation("mode", message))?,
            Some(_) => return Err(SearchError::validation("mode", "must be a string")),
        };

        let raw = match envelope.get("raw") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(raw)) => *raw,
            Some(_) => return Err(SearchError::validation("raw", "must be a boolean")),
        };

        Ok(SearchRequest {
            params: SearchParams::from_validated(params),
            mode,
            raw,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new("google_light")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn field_of(err: SearchError) -> String {
        match err {
            SearchError::Validation { field, .. } => field,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_engine_applied() {
        let builder = RequestBuilder::default();
        let request = builder.build(&json!({"params": {"q": "coffee"}})).unwrap();

        assert_eq!(request.params.query(), "coffee");
        assert_eq!(request.params.engine(), "google_light");
        assert_eq!(request.mode, ResponseMode::Complete);
        assert!(!request.raw);
    }

    #[test]
    fn test_blank_engine_replaced() {
        let builder = RequestBuilder::new("google");
        for engine in [json!(""), json!("   "), Value::Null] {
            let request = builder
                .build(&json!({"params": {"q": "x", "engine": engine}}))
                .unwrap();
            assert_eq!(request.params.engine(), "google");
        }
    }

    #[test]
    fn test_explicit_engine_kept() {
        let builder = RequestBuilder::default();
        let request = builder
            .build(&json!({"params": {"q": "AAPL stock", "engine": "google"}}))
            .unwrap();
        assert_eq!(request.params.engine(), "google");
    }

    #[test]
    fn test_missing_or_empty_q() {
        let builder = RequestBuilder::default();
        let cases = [
            Value::Null,
            json!({}),
            json!({"params": {}}),
            json!({"params": {"q": ""}}),
            json!({"params": {"q": "   "}}),
            json!({"params": {"q": 42}}),
            json!({"params": {"engine": "google"}}),
        ];

        for case in cases {
            let err = builder.build(&case).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValidationError);
            assert_eq!(field_of(err), "q");
        }
    }

    #[test]
    fn test_mode_validation() {
        let builder = RequestBuilder::default();

        let request = builder
            .build(&json!({"params": {"q": "x"}, "mode": "compact"}))
            .unwrap();
        assert_eq!(request.mode, ResponseMode::Compact);

        let err = builder
            .build(&json!({"params": {"q": "x"}, "mode": "summary"}))
            .unwrap_err();
        assert_eq!(field_of(err), "mode");

        let err = builder
            .build(&json!({"params": {"q": "x"}, "mode": 1}))
            .unwrap_err();
        assert_eq!(field_of(err), "mode");
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let builder = RequestBuilder::default();
        let request = builder
            .build(&json!({
                "params": {
                    "q": "coffee shops",
                    "location": "Austin, TX",
                    "num": 5,
                    "device": {"type": "mobile"}
                }
            }))
            .unwrap();

        assert_eq!(request.params.get("location"), Some(&json!("Austin, TX")));
        assert_eq!(request.params.get("num"), Some(&json!(5)));
        assert_eq!(request.params.get("device"), Some(&json!({"type": "mobile"})));
    }

    #[test]
    fn test_api_key_is_stripped() {
        let builder = RequestBuilder::default();
        let request = builder
            .build(&json!({"params": {"q": "x", "api_key": "leaked"}}))
            .unwrap();
        assert!(request.params.get("api_key").is_none());
    }

    #[test]
    fn test_envelope_shape_errors() {
        let builder = RequestBuilder::default();
        assert_eq!(field_of(builder.build(&json!("q")).unwrap_err()), "arguments");
        assert_eq!(
            field_of(builder.build(&json!({"params": []})).unwrap_err()),
            "params"
        );
        assert_eq!(
            field_of(
                builder
                    .build(&json!({"params": {"q": "x"}, "raw": "yes"}))
                    .unwrap_err()
            ),
            "raw"
        );
        assert_eq!(
            field_of(
                builder
                    .build(&json!({"params": {"q": "x", "engine": 3}}))
                    .unwrap_err()
            ),
            "engine"
        );
    }

    #[test]
    fn test_raw_flag() {
        let builder = RequestBuilder::default();
        let request = builder
            .build(&json!({"params": {"q": "x"}, "raw": true}))
            .unwrap();
        assert!(request.raw);
    }
}
