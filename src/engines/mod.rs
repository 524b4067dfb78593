//! Engine schema catalogue
//!
//! Holds the per-engine parameter documents served as MCP resources, plus
//! the builder that produces them from the backend's parameter dump. The
//! catalogue is loaded once at startup and only replaced by an explicit
//! rebuild.

pub mod builder;
mod loader;
mod registry;

pub use loader::EngineLoader;
pub use registry::{EngineSchema, EngineSchemaRegistry, ParamSpec};

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::info;

/// Catalogue bound to a schema directory, swappable as a whole
#[derive(Debug)]
pub struct SchemaCatalogue {
    dir: PathBuf,
    current: RwLock<Arc<EngineSchemaRegistry>>,
}

impl SchemaCatalogue {
    /// Load the catalogue from `dir`
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let registry = EngineLoader::load_dir(&dir)?;
        Ok(Self {
            dir,
            current: RwLock::new(Arc::new(registry)),
        })
    }

    /// Wrap an already built registry
    pub fn from_registry(dir: impl Into<PathBuf>, registry: EngineSchemaRegistry) -> Self {
        Self {
            dir: dir.into(),
            current: RwLock::new(Arc::new(registry)),
        }
    }

    /// Directory the catalogue is read from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current registry snapshot
    pub fn snapshot(&self) -> Arc<EngineSchemaRegistry> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Re-read the directory and swap in the new registry.
    ///
    /// Readers holding an older snapshot keep it until they drop it.
    pub fn rebuild(&self) -> Result<usize> {
        let registry = EngineLoader::load_dir(&self.dir)?;
        let count = registry.len();

        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(registry);

        info!("Engine catalogue rebuilt with {} schemas", count);
        Ok(count)
    }
}
