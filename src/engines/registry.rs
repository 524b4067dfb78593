//! Engine schema registry for discovering accepted parameters per engine

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Description of a single engine parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamSpec {
    /// Plain-text description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Input kind as published by the backend (text, select, checkbox, ...)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Accepted values, either bare or `[value, label]` pairs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
    /// Whether the backend requires the parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Parameter group the backend files it under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Parameter schema document for one engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSchema {
    /// Engine name as passed in the `engine` parameter
    pub engine: String,
    /// Engine-specific parameters
    pub params: BTreeMap<String, ParamSpec>,
    /// Parameters shared by every engine
    pub common_params: BTreeMap<String, ParamSpec>,
}

impl EngineSchema {
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            ..Default::default()
        }
    }

    /// Look up a parameter in either section
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.get(name).or_else(|| self.common_params.get(name))
    }

    /// Names of required engine parameters
    pub fn required_params(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(_, spec)| spec.required == Some(true))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Read-only registry of engine schemas, keyed by engine name
#[derive(Debug, Clone, Default)]
pub struct EngineSchemaRegistry {
    schemas: BTreeMap<String, EngineSchema>,
}

impl EngineSchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema, replacing any previous one for the same engine
    pub fn register(&mut self, schema: EngineSchema) {
        self.schemas.insert(schema.engine.clone(), schema);
    }

    /// Get a schema by engine name
    pub fn get(&self, engine: &str) -> Option<&EngineSchema> {
        self.schemas.get(engine)
    }

    /// All engine names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.schemas.keys().map(|s| s.as_str()).collect()
    }

    /// Check if an engine exists
    pub fn contains(&self, engine: &str) -> bool {
        self.schemas.contains_key(engine)
    }

    /// Get number of registered engines
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Index document listing every engine
    pub fn index(&self) -> Value {
        json!({ "engines": self.names() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(engine: &str) -> EngineSchema {
        let mut schema = EngineSchema::new(engine);
        schema.params.insert(
            "q".to_string(),
            ParamSpec {
                description: Some("Search query".to_string()),
                kind: Some("text".to_string()),
                required: Some(true),
                group: Some("search_query".to_string()),
                ..Default::default()
            },
        );
        schema.common_params.insert(
            "no_cache".to_string(),
            ParamSpec {
                kind: Some("checkbox".to_string()),
                group: Some("serpapi_parameters".to_string()),
                ..Default::default()
            },
        );
        schema
    }

    #[test]
    fn test_registry() {
        let mut registry = EngineSchemaRegistry::new();
        registry.register(schema("google_light"));
        registry.register(schema("bing"));

        assert!(registry.contains("bing"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["bing", "google_light"]);
        assert_eq!(
            registry.index(),
            json!({"engines": ["bing", "google_light"]})
        );
    }

    #[test]
    fn test_schema_lookup() {
        let schema = schema("google");
        assert!(schema.param("q").is_some());
        assert!(schema.param("no_cache").is_some());
        assert!(schema.param("missing").is_none());
        assert_eq!(schema.required_params(), vec!["q"]);
    }

    #[test]
    fn test_schema_round_trips_type_field() {
        let json = serde_json::to_value(schema("google")).unwrap();
        assert_eq!(json["params"]["q"]["type"], "text");
        assert!(json["params"]["q"].get("options").is_none());

        let parsed: EngineSchema = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, schema("google"));
    }
}
