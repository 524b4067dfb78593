//! Application state shared across handlers

use crate::config::Settings;
use crate::engines::SchemaCatalogue;
use crate::network::{Backend, RetryingDispatcher};
use crate::query::RequestBuilder;
use crate::search::{Credential, Search};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Engine schema catalogue
    pub catalogue: Arc<SchemaCatalogue>,
    /// Search executor
    pub search: Arc<Search>,
}

impl AppState {
    /// Create new application state around a backend
    pub fn new(settings: Settings, catalogue: SchemaCatalogue, backend: Arc<dyn Backend>) -> Self {
        let dispatcher = RetryingDispatcher::new(backend, settings.retry_policy());
        let search = Search::new(
            RequestBuilder::new(settings.serpapi.default_engine.clone()),
            dispatcher,
        );
        Self::with_search(settings, catalogue, search)
    }

    /// Create state with a preassembled executor
    pub fn with_search(settings: Settings, catalogue: SchemaCatalogue, search: Search) -> Self {
        Self {
            settings: Arc::new(settings),
            catalogue: Arc::new(catalogue),
            search: Arc::new(search),
        }
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }

    /// Credential configured for the process, if any
    pub fn configured_credential(&self) -> Option<Credential> {
        self.settings
            .serpapi
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(Credential::new)
    }
}
