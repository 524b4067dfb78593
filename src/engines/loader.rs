//! Engine loader for reading the schema catalogue from disk

use super::registry::{EngineSchema, EngineSchemaRegistry};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Loader for the per-engine schema documents
pub struct EngineLoader;

impl EngineLoader {
    /// Load every `*.json` schema in `dir`.
    ///
    /// A missing directory yields an empty registry; unreadable files are
    /// skipped with a warning.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<EngineSchemaRegistry> {
        let dir = dir.as_ref();
        let mut registry = EngineSchemaRegistry::new();

        if !dir.is_dir() {
            warn!("Engine schema directory {} not found", dir.display());
            return Ok(registry);
        }

        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .with_context(|| format!("reading {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            match Self::load_file(&path) {
                Ok(schema) => {
                    debug!("Loaded engine schema: {}", schema.engine);
                    registry.register(schema);
                }
                Err(e) => {
                    warn!("Failed to load engine schema {}: {:#}", path.display(), e);
                }
            }
        }

        info!("Loaded {} engine schemas", registry.len());
        Ok(registry)
    }

    /// Load a single schema document
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<EngineSchema> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut schema: EngineSchema = serde_json::from_str(&content)?;

        if schema.engine.trim().is_empty() {
            schema.engine = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .context("schema has no engine name")?;
        }

        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("google_light.json"),
            r#"{"engine": "google_light", "params": {"q": {"type": "text", "required": true}}, "common_params": {}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("bing.json"), r#"{"params": {}}"#).unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let registry = EngineLoader::load_dir(dir.path()).unwrap();

        assert_eq!(registry.names(), vec!["bing", "google_light"]);
        let google = registry.get("google_light").unwrap();
        assert_eq!(google.required_params(), vec!["q"]);
    }

    #[test]
    fn test_bundled_catalogue_loads() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("engines");
        let registry = EngineLoader::load_dir(dir).unwrap();

        let google_light = registry.get("google_light").unwrap();
        assert_eq!(google_light.required_params(), vec!["q"]);
        assert!(google_light.common_params.contains_key("no_cache"));
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = EngineLoader::load_dir(dir.path().join("nope")).unwrap();
        assert!(registry.is_empty());
    }
}
