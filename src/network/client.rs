//! HTTP client for the SerpApi search endpoint

use super::backend::Backend;
use crate::config::{OutgoingSettings, SerpApiSettings};
use crate::error::{Result, SearchError};
use crate::results::RawResult;
use crate::search::{Credential, SearchParams};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// User agent sent with every backend request
const USER_AGENT: &str = concat!("serpapi-mcp/", env!("CARGO_PKG_VERSION"));

/// Longest backend error text carried into an error message
const MAX_ERROR_TEXT: usize = 300;

/// HTTP client wrapper bound to one SerpApi deployment
#[derive(Clone)]
pub struct SerpApiClient {
    client: Client,
    search_url: Url,
    extra_headers: HashMap<String, String>,
}

impl SerpApiClient {
    /// Create a client for the public SerpApi service with default settings
    pub fn new() -> anyhow::Result<Self> {
        Self::with_settings(&OutgoingSettings::default(), &SerpApiSettings::default())
    }

    /// Create a client with custom settings
    pub fn with_settings(
        outgoing: &OutgoingSettings,
        serpapi: &SerpApiSettings,
    ) -> anyhow::Result<Self> {
        let timeout = Duration::try_from_secs_f64(outgoing.request_timeout)
            .map_err(|e| anyhow::anyhow!("invalid request timeout {}: {e}", outgoing.request_timeout))?;

        let mut builder = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(outgoing.pool_maxsize)
            .user_agent(USER_AGENT)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !outgoing.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = outgoing.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = outgoing.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = outgoing.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            search_url: search_url(&serpapi.base_url)?,
            extra_headers: outgoing.extra_headers.clone(),
        })
    }

    /// Endpoint every search is sent to
    pub fn search_url(&self) -> &Url {
        &self.search_url
    }
}

#[async_trait]
impl Backend for SerpApiClient {
    fn name(&self) -> &str {
        "serpapi"
    }

    async fn fetch(&self, params: &SearchParams, credential: &Credential) -> Result<RawResult> {
        let mut query = params.to_query_pairs();
        query.push(("api_key".to_string(), credential.expose().to_string()));

        let mut request = self.client.get(self.search_url.clone()).query(&query);
        for (key, value) in &self.extra_headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(transport_error)?;

        let status = response.status().as_u16();
        let retry_after = parse_retry_after(response.headers());
        let text = response.text().await.map_err(transport_error)?;

        if !(200..300).contains(&status) {
            return Err(classify_status(status, retry_after, &text));
        }

        serde_json::from_str::<Value>(&text)
            .map(RawResult::new)
            .map_err(|e| SearchError::TransientNetwork(format!("undecodable backend response: {e}")))
    }
}

/// Resolve `{base_url}/search.json`
fn search_url(base_url: &str) -> anyhow::Result<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("search.json")?)
}

/// Map a reqwest failure without leaking the request URL (it carries the key)
fn transport_error(err: reqwest::Error) -> SearchError {
    let err = err.without_url();
    if err.is_timeout() {
        SearchError::TransientNetwork(format!("request timed out: {err}"))
    } else if err.is_connect() {
        SearchError::TransientNetwork(format!("connection failed: {err}"))
    } else {
        SearchError::TransientNetwork(err.to_string())
    }
}

/// Classify a non-success HTTP status from the backend
pub fn classify_status(status: u16, retry_after: Option<Duration>, body: &str) -> SearchError {
    let message = backend_message(status, body);
    match status {
        401 | 403 => SearchError::Auth(message),
        429 => SearchError::RateLimited {
            message,
            retry_after,
        },
        408 | 500..=599 => SearchError::TransientNetwork(format!("HTTP {status}: {message}")),
        _ => SearchError::BadRequest(format!("HTTP {status}: {message}")),
    }
}

/// Extract the backend's own error text, falling back to the raw body
fn backend_message(status: u16, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(error)) = map.get("error") {
            return error.clone();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("no response body")
            .to_string();
    }

    trimmed.chars().take(MAX_ERROR_TEXT).collect()
}

/// Parse a `Retry-After` header given in whole seconds
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
