//! Settings structures for the SerpApi MCP server

use crate::network::RetryPolicy;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main settings structure, loaded from settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub serpapi: SerpApiSettings,
    pub retry: RetrySettings,
    pub outgoing: OutgoingSettings,
    pub engines: EngineCatalogueSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables
    pub fn merge_env(&mut self) {
        self.merge_vars(|name| std::env::var(name).ok());
    }

    /// Merge overrides from an arbitrary variable source
    pub fn merge_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = var("SERPAPI_API_KEY") {
            if !val.trim().is_empty() {
                self.serpapi.api_key = Some(val);
            }
        }
        if let Some(val) = var("SERPAPI_BASE_URL") {
            self.serpapi.base_url = val;
        }
        if let Some(val) = var("SERPAPI_MCP_DEFAULT_ENGINE") {
            self.serpapi.default_engine = val;
        }
        if let Some(val) = var("SERPAPI_MCP_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Some(val) = var("SERPAPI_MCP_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("SERPAPI_MCP_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = var("SERPAPI_MCP_ENGINES_DIR") {
            self.engines.schema_dir = PathBuf::from(val);
        }
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        let retry = &self.retry;
        if retry.max_attempts == 0 {
            bail!("retry.max_attempts must be at least 1");
        }
        if !(0.0..1.0).contains(&retry.jitter_fraction) {
            bail!("retry.jitter_fraction must be in [0, 1)");
        }
        if retry.base_delay_ms > retry.max_delay_ms {
            bail!("retry.base_delay_ms must not exceed retry.max_delay_ms");
        }
        if retry.deadline_ms == 0 {
            bail!("retry.deadline_ms must be at least 1");
        }
        let timeout = self.outgoing.request_timeout;
        if !timeout.is_finite() || timeout <= 0.0 {
            bail!("outgoing.request_timeout must be a positive number of seconds, got {timeout}");
        }
        if self.serpapi.default_engine.trim().is_empty() {
            bail!("serpapi.default_engine must not be empty");
        }
        if url::Url::parse(&self.serpapi.base_url).is_err() {
            bail!("serpapi.base_url is not a valid URL: {}", self.serpapi.base_url);
        }
        Ok(())
    }

    /// Build the process-wide retry policy
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
            jitter_fraction: self.retry.jitter_fraction,
            deadline: Duration::from_millis(self.retry.deadline_ms),
        }
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Server name reported to MCP clients
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "SerpApi MCP Server".to_string(),
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
    /// Route the administrative endpoints
    pub enable_admin: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_address: "127.0.0.1".to_string(),
            enable_admin: false,
        }
    }
}

/// Backend settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpApiSettings {
    /// Base URL of the SerpApi service
    pub base_url: String,
    /// Fallback API key used when the transport supplies none
    pub api_key: Option<String>,
    /// Engine applied when the caller does not name one
    pub default_engine: String,
}

impl std::fmt::Debug for SerpApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("default_engine", &self.default_engine)
            .finish()
    }
}

impl Default for SerpApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://serpapi.com".to_string(),
            api_key: None,
            default_engine: "google_light".to_string(),
        }
    }
}

/// Retry and deadline settings for backend dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay_ms: u64,
    /// Upper bound for any single wait
    pub max_delay_ms: u64,
    /// Random spread applied to computed delays
    pub jitter_fraction: f64,
    /// Budget for the whole dispatch, waits included
    pub deadline_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            jitter_fraction: 0.2,
            deadline_ms: 60_000,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Per-request timeout in seconds
    pub request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 30.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Engine schema catalogue settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineCatalogueSettings {
    /// Directory holding one `<engine>.json` schema per engine
    pub schema_dir: PathBuf,
}

impl Default for EngineCatalogueSettings {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("engines"),
        }
    }
}
