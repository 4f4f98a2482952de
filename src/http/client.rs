//! Upstream HTTP client
//!
//! GET-only transport for page requests: base URL joining, static headers,
//! per-request query, optional throttling and retries. Every non-2xx status
//! becomes an error here so callers only ever see page bodies.

use super::retry::RetryPolicy;
use super::throttle::{RateLimit, Throttle};
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Retry-After fallback when the upstream omits or garbles the header
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Longest upstream error body kept in [`Error::HttpStatus`]
const MAX_ERROR_BODY_BYTES: usize = 512;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Prefix for relative request paths
    pub base_url: Option<String>,
    /// Per-request timeout, covering headers and body
    pub timeout: Duration,
    /// Transport-level retries
    pub retry: RetryPolicy,
    /// Client-side quota
    pub rate_limit: Option<RateLimit>,
    /// Headers sent with every request, in insertion order
    pub headers: Vec<(String, String)>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::none(),
            rate_limit: None,
            headers: Vec::new(),
            user_agent: format!("hopstream/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }

    /// Value of a static header, if configured
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Builder for [`HttpClientConfig`]
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    pub fn rate_limit(mut self, limit: Option<RateLimit>) -> Self {
        self.config.rate_limit = limit;
        self
    }

    /// Add a static header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.push((key.into(), value.into()));
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Outcome of a single send
enum Attempt {
    Body(String),
    Failed {
        error: Error,
        /// Server-requested wait before the next attempt
        wait: Option<Duration>,
    },
}

/// Upstream HTTP client
///
/// Cheap to clone: the reqwest pool and the throttle are shared.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    throttle: Option<Throttle>,
}

impl HttpClient {
    /// Build a client, rejecting malformed base URLs and headers up front
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        if let Some(base) = &config.base_url {
            Url::parse(base)?;
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(header_map(&config.headers)?)
            .build()?;

        let throttle = config.rate_limit.as_ref().map(Throttle::new);

        Ok(Self {
            client,
            config,
            throttle,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn is_throttled(&self) -> bool {
        self.throttle.is_some()
    }

    /// GET `path` with `query` and return the body of a 2xx response
    ///
    /// Dropping the returned future aborts the request in flight.
    pub async fn get_text(&self, path: &str, query: &[(String, String)]) -> Result<String> {
        let url = self.endpoint(path)?;
        let mut attempt = 0;

        loop {
            if let Some(throttle) = &self.throttle {
                throttle.acquire().await;
            }

            let (error, wait) = match self.send(&url, query).await {
                Attempt::Body(body) => {
                    debug!("GET {} ({} bytes)", url, body.len());
                    return Ok(body);
                }
                Attempt::Failed { error, wait } => (error, wait),
            };

            if !self.config.retry.should_retry(&error, attempt) {
                return Err(error);
            }

            let delay = wait
                .map_or_else(|| self.config.retry.delay_for(attempt), |w| {
                    w.min(self.config.retry.max_delay)
                });
            attempt += 1;
            warn!(
                "GET {} failed ({}), retry {}/{} in {:?}",
                url, error, attempt, self.config.retry.max_retries, delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn send(&self, url: &Url, query: &[(String, String)]) -> Attempt {
        let request = self.client.get(url.clone()).query(query);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return self.failed(e),
        };

        let status = response.status();
        if status.is_success() {
            return match response.text().await {
                Ok(body) => Attempt::Body(body),
                Err(e) => self.failed(e),
            };
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after(&response);
            return Attempt::Failed {
                error: Error::RateLimited {
                    retry_after_seconds: retry_after,
                },
                wait: Some(Duration::from_secs(retry_after)),
            };
        }

        let body = response.text().await.unwrap_or_default();
        Attempt::Failed {
            error: Error::http_status(status.as_u16(), truncate_body(body)),
            wait: None,
        }
    }

    fn failed(&self, error: reqwest::Error) -> Attempt {
        let error = if error.is_timeout() {
            Error::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            Error::Http(error)
        };
        Attempt::Failed { error, wait: None }
    }

    /// Resolve a request path against the base URL
    ///
    /// Absolute URLs pass through unchanged. The base URL's own path is kept,
    /// so `http://host/api` + `/v2/beers` is `http://host/api/v2/beers`.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }

        let base = self
            .config
            .base_url
            .as_deref()
            .ok_or_else(|| Error::missing_field("upstream.base_url"))?;

        let joined = format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&joined)?)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("throttled", &self.throttle.is_some())
            .finish_non_exhaustive()
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| Error::invalid_value(format!("upstream.headers.{key}"), e.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::invalid_value(format!("upstream.headers.{key}"), e.to_string()))?;
        map.append(name, value);
    }
    Ok(map)
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY_BYTES {
        let mut end = MAX_ERROR_BODY_BYTES;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str("...");
    }
    body
}

fn retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
