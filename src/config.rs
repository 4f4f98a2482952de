//! Application configuration
//!
//! Everything the service needs is supplied here and injected at
//! construction; nothing in the pipeline reads global state. Values come
//! from an optional YAML file and may be overridden on the command line.
//!
//! ```yaml
//! server:
//!   port: 8080
//! upstream:
//!   base_url: https://api.punkapi.com
//!   path: /v2/beers
//!   page_size: 80
//!   headers:
//!     Accept: application/json
//! filter:
//!   min_abv: 7.0
//! ```

use crate::decode::PageDecoder;
use crate::error::{Error, Result};
use crate::fetch::HttpPageFetcher;
use crate::http::{HttpClient, HttpClientConfig, RateLimit, RetryPolicy};
use crate::pagination::PageNumberConfig;
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Inbound HTTP server settings
    pub server: ServerSettings,
    /// Upstream API settings
    pub upstream: UpstreamConfig,
    /// Default filter settings
    pub filter: FilterConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Check every field that could make the service misbehave
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.upstream.validate()?;
        self.filter.validate()?;
        Ok(())
    }
}

// ============================================================================
// Server
// ============================================================================

/// Inbound HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::invalid_value("server.port", "must be non-zero"));
        }
        if self.host.trim().is_empty() {
            return Err(Error::missing_field("server.host"));
        }
        Ok(())
    }
}

// ============================================================================
// Upstream
// ============================================================================

/// Upstream API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API (e.g., "https://api.punkapi.com")
    pub base_url: String,
    /// Collection path (e.g., "/v2/beers")
    pub path: String,
    /// Pagination parameters
    #[serde(flatten)]
    pub paging: PageNumberConfig,
    /// Dot-separated path to the record array, when not top-level
    pub record_path: Option<String>,
    /// User agent sent with every request
    pub user_agent: String,
    /// Extra static headers
    pub headers: HashMap<String, String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Transport-level retries (0 = never retry)
    pub max_retries: u32,
    /// Backoff between transport retries
    pub backoff: BackoffType,
    /// Client-side rate limit
    pub rate_limit: Option<RateLimit>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            path: "/v2/beers".to_string(),
            paging: PageNumberConfig::default(),
            record_path: None,
            user_agent: format!("hopstream/{}", env!("CARGO_PKG_VERSION")),
            headers: HashMap::new(),
            timeout_secs: 30,
            max_retries: 0,
            backoff: BackoffType::default(),
            rate_limit: None,
        }
    }
}

impl UpstreamConfig {
    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::missing_field("upstream.base_url"));
        }
        let url = url::Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "upstream.base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if self.paging.page_param.is_empty() {
            return Err(Error::missing_field("upstream.page_param"));
        }
        if self.paging.page_size == Some(0) {
            return Err(Error::invalid_value("upstream.page_size", "must be positive"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("upstream.timeout_secs", "must be positive"));
        }
        Ok(())
    }

    /// Transport configuration for this upstream
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(self.base_url.clone())
            .timeout(Duration::from_secs(self.timeout_secs))
            .retry(RetryPolicy::new(self.max_retries, self.backoff))
            .rate_limit(self.rate_limit.clone())
            .user_agent(self.user_agent.clone());

        for (key, value) in &self.headers {
            builder = builder.header(key.clone(), value.clone());
        }
        builder.build()
    }

    /// Build the page fetcher for this upstream
    pub fn build_fetcher(&self) -> Result<HttpPageFetcher> {
        let client = HttpClient::with_config(self.http_config())?;
        let decoder = match &self.record_path {
            Some(path) => PageDecoder::with_path(path.clone()),
            None => PageDecoder::new(),
        };
        Ok(HttpPageFetcher::new(client, self.path.clone())
            .with_paging(self.paging.clone())
            .with_decoder(decoder))
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Default filter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Records with abv strictly above this are returned
    pub min_abv: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { min_abv: 7.0 }
    }
}

impl FilterConfig {
    fn validate(&self) -> Result<()> {
        validate_threshold(self.min_abv)
            .map_err(|m| Error::invalid_value("filter.min_abv", m))?;
        Ok(())
    }
}

/// Check an abv threshold, returning a message on failure
pub fn validate_threshold(value: f64) -> std::result::Result<f64, String> {
    if !value.is_finite() {
        return Err("must be a finite number".to_string());
    }
    if value < 0.0 {
        return Err("must not be negative".to_string());
    }
    Ok(value)
}
