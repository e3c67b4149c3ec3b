//! HTTP transport for the Tracker API
//!
//! Every request the connector makes flows through [`HttpClient`]. The
//! client owns all transport policy: pacing through the rate limiter,
//! retrying throttled and failed requests with backoff, resolving
//! paths against the API root, and attaching the token header. The
//! fetch loop above it only decides what to request next.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::TokenAuthenticator;
use crate::error::{Error, Result};
use crate::types::{BackoffType, StringMap};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Wait applied to a 429 response that carries no Retry-After header
const DEFAULT_RETRY_AFTER_SECONDS: u64 = 60;

// ============================================================================
// Client Configuration
// ============================================================================

/// Transport policy for the client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// API root every relative path is resolved against
    pub base_url: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Ceiling on any computed delay
    pub max_backoff: Duration,
    /// How the delay grows across attempts
    pub backoff_type: BackoffType,
    /// Request pacing, disabled when `None`
    pub rate_limit: Option<RateLimiterConfig>,
    /// Headers attached to every request
    pub default_headers: StringMap,
    /// User agent identifying this connector
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
            default_headers: StringMap::new(),
            user_agent: format!("tracker-source/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Start building a config from the defaults
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for [`HttpClientConfig`]
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// API root for relative request paths
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Retries after the initial attempt
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Backoff shape and bounds
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Pace requests with the given token bucket
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Send requests unpaced
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Attach a header to every request
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Override the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Finish the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

// ============================================================================
// Per-Request Options
// ============================================================================

/// Options for one request on top of the client config
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters, appended in order
    pub query: Vec<(String, String)>,
    /// Extra headers for this request
    pub headers: StringMap,
    /// Timeout override
    pub timeout: Option<Duration>,
    /// Retry-count override
    pub max_retries: Option<u32>,
}

impl RequestConfig {
    /// Empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a request header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Override the timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the retry count
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
}

// ============================================================================
// Client
// ============================================================================

/// Authenticated, rate-limited, retrying HTTP client
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Option<TokenAuthenticator>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Client with default policy and no credentials
    pub fn new() -> Self {
        Self::with_config(HttpClientConfig::default())
    }

    /// Unauthenticated client with the given policy
    pub fn with_config(config: HttpClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to build HTTP client");

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Self {
            client,
            config,
            authenticator: None,
            rate_limiter,
        }
    }

    /// Client that sends the token header on every request
    pub fn with_auth(config: HttpClientConfig, auth: TokenAuthenticator) -> Self {
        let mut client = Self::with_config(config);
        client.authenticator = Some(auth);
        client
    }

    /// Replace the credentials
    pub fn set_authenticator(&mut self, auth: TokenAuthenticator) {
        self.authenticator = Some(auth);
    }

    /// GET a path under the API root
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.request(Method::GET, url, RequestConfig::default())
            .await
    }

    /// GET with per-request options
    pub async fn get_with_config(&self, url: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::GET, url, config).await
    }

    /// Send one request, retrying per the configured policy
    ///
    /// Throttles (429) wait out the advertised Retry-After; transient
    /// server errors and transport failures back off and retry; any
    /// other client error fails immediately with the API's message.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<Response> {
        let full_url = self.resolve_url(url);
        let max_retries = config.max_retries.unwrap_or(self.config.max_retries);
        let timeout = config.timeout.unwrap_or(self.config.timeout);

        let mut last_error = None;

        for attempt in 0..=max_retries {
            if let Some(limiter) = &self.rate_limiter {
                limiter.wait().await;
            }

            let request = self.assemble(method.clone(), &full_url, &config, timeout);

            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    let mapped = if err.is_timeout() {
                        Error::Timeout {
                            timeout_ms: timeout.as_millis() as u64,
                        }
                    } else {
                        Error::Http(err)
                    };
                    // Timeouts and connection failures are worth another
                    // attempt; anything else in the transport is not.
                    let retry = match &mapped {
                        Error::Timeout { .. } => true,
                        Error::Http(e) => e.is_connect(),
                        _ => false,
                    };
                    if retry && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %mapped,
                            "transport error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        last_error = Some(mapped);
                        continue;
                    }
                    return Err(mapped);
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = retry_after_seconds(&response);
                if attempt < max_retries {
                    warn!(attempt, wait_seconds = wait, "throttled by the API");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                    last_error = Some(Error::RateLimited {
                        retry_after_seconds: wait,
                    });
                    continue;
                }
                return Err(Error::RateLimited {
                    retry_after_seconds: wait,
                });
            }

            if is_retryable_status(status) && attempt < max_retries {
                let delay = self.calculate_backoff(attempt);
                warn!(
                    status = status.as_u16(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "server error, retrying"
                );
                tokio::time::sleep(delay).await;
                last_error = Some(Error::HttpStatus {
                    status: status.as_u16(),
                    body: String::new(),
                });
                continue;
            }

            if status.is_client_error() || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::HttpStatus {
                    status: status.as_u16(),
                    body: api_error_text(&body),
                });
            }

            debug!(status = status.as_u16(), url = %full_url, "request completed");
            return Ok(response);
        }

        Err(last_error.unwrap_or(Error::MaxRetriesExceeded { max_retries }))
    }

    /// GET a path and deserialize the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get_json_with_config(url, RequestConfig::default())
            .await
    }

    /// GET with options and deserialize the JSON body
    pub async fn get_json_with_config<T: DeserializeOwned>(
        &self,
        url: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let response = self.get_with_config(url, config).await?;
        let json: T = response.json().await.map_err(Error::Http)?;
        Ok(json)
    }

    /// Whether requests are being paced
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Delay before retrying the given attempt number
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let base = self.config.initial_backoff;
        let delay = match self.config.backoff_type {
            BackoffType::Constant => base,
            BackoffType::Linear => base * (attempt + 1),
            BackoffType::Exponential => base * 2u32.saturating_pow(attempt),
        };
        delay.min(self.config.max_backoff)
    }

    /// Compose one outgoing request
    fn assemble(
        &self,
        method: Method,
        url: &str,
        config: &RequestConfig,
        timeout: Duration,
    ) -> RequestBuilder {
        let mut request = self.client.request(method, url).timeout(timeout);

        for (key, value) in &self.config.default_headers {
            request = request.header(key.as_str(), value.as_str());
        }
        for (key, value) in &config.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if !config.query.is_empty() {
            request = request.query(&config.query);
        }
        if let Some(auth) = &self.authenticator {
            request = auth.apply(request);
        }

        request
    }

    /// Resolve a path against the API root
    ///
    /// Absolute URLs pass through untouched so callers can follow
    /// server-provided links.
    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => path.to_string(),
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_authenticator", &self.authenticator.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Response Classification
// ============================================================================

/// Statuses that justify another attempt
fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502..=504 | 520..=524)
}

/// Seconds to wait out a throttle, from the Retry-After header
fn retry_after_seconds(response: &Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|text| text.parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECONDS)
}

/// Pull the readable message out of a Tracker error body
///
/// Error responses carry a JSON envelope with `code`, `kind`,
/// `error`, and sometimes `general_problem` fields. Bodies that do
/// not match that shape come back unchanged.
fn api_error_text(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    let Some(message) = value.get("error").and_then(Value::as_str) else {
        return body.to_string();
    };
    match value.get("general_problem").and_then(Value::as_str) {
        Some(problem) => format!("{message} ({problem})"),
        None => message.to_string(),
    }
}
