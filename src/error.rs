//! Error types for the Tracker source connector
//!
//! Everything that can fail during spec, check, discover, or read
//! funnels into [`Error`]. Fallible APIs across the crate return the
//! [`Result`] alias defined at the bottom of this module.

use thiserror::Error;

/// The main error type for the connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Transport
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Response Handling
    // ============================================================================
    #[error("Pagination header error: {message}")]
    Pagination { message: String },

    #[error("Unexpected response shape: {message}")]
    Decode { message: String },

    // ============================================================================
    // Sync State
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // Connector Protocol
    // ============================================================================
    #[error("Connection check failed: {message}")]
    ConnectionCheck { message: String },

    #[error("Stream '{stream}' not found in catalog")]
    StreamNotFound { stream: String },

    // ============================================================================
    // Environment
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Configuration error with a free-form message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Required config field was absent or empty
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Non-success response from the API
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Pagination headers were missing or unreadable
    pub fn pagination(message: impl Into<String>) -> Self {
        Self::Pagination {
            message: message.into(),
        }
    }

    /// Response body did not have the expected shape
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Persisted sync state could not be read or applied
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Connection check could not reach the API
    pub fn connection_check(message: impl Into<String>) -> Self {
        Self::ConnectionCheck {
            message: message.into(),
        }
    }

    /// Whether retrying the failed operation could succeed
    ///
    /// True for transport failures, throttling, and the status codes
    /// the HTTP client itself retries. Configuration, decoding, and
    /// state errors are permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Statuses worth retrying: throttling, server errors, CDN errors
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502..=504 | 520..=524)
}

/// Result type alias for the connector
pub type Result<T> = std::result::Result<T, Error>;

/// Adds a context prefix to any [`Result`] carrying [`Error`]
pub trait ResultExt<T> {
    /// Prefix the error with a fixed context message
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Prefix the error with a lazily built context message
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_messages_render_with_their_detail() {
        assert_eq!(
            Error::missing_field("api_token").to_string(),
            "Missing required config field: api_token"
        );
        assert_eq!(
            Error::http_status(401, "Needs authentication credentials.").to_string(),
            "HTTP 401: Needs authentication credentials."
        );
        assert_eq!(
            Error::pagination("X-Tracker-Pagination-Limit missing").to_string(),
            "Pagination header error: X-Tracker-Pagination-Limit missing"
        );
        assert_eq!(
            Error::state("cursor '13 Jan' is not a timestamp").to_string(),
            "State error: cursor '13 Jan' is not a timestamp"
        );
        assert_eq!(
            Error::StreamNotFound {
                stream: "stories".to_string()
            }
            .to_string(),
            "Stream 'stories' not found in catalog"
        );
    }

    #[test_case(429, true; "throttled")]
    #[test_case(500, true; "internal server error")]
    #[test_case(502, true; "bad gateway")]
    #[test_case(504, true; "gateway timeout")]
    #[test_case(522, true; "cdn connection timed out")]
    #[test_case(400, false; "bad request")]
    #[test_case(401, false; "unauthenticated")]
    #[test_case(404, false; "not found")]
    #[test_case(501, false; "not implemented")]
    fn test_status_retryability(status: u16, expected: bool) {
        assert_eq!(Error::http_status(status, "").is_retryable(), expected);
    }

    #[test]
    fn test_transport_failures_are_retryable() {
        assert!(Error::Timeout { timeout_ms: 30_000 }.is_retryable());
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
    }

    #[test]
    fn test_permanent_failures_are_not_retryable() {
        assert!(!Error::config("api_token is empty").is_retryable());
        assert!(!Error::decode("expected a JSON array").is_retryable());
        assert!(!Error::state("unknown stream").is_retryable());
    }

    #[test]
    fn test_context_prefixes_the_inner_error() {
        let result: Result<()> = Err(Error::state("no cursor"));
        let err = result.context("loading saved state").unwrap_err();
        assert_eq!(err.to_string(), "loading saved state: State error: no cursor");
    }

    #[test]
    fn test_with_context_builds_the_prefix_lazily() {
        let result: Result<()> = Err(Error::decode("not an array"));
        let err = result
            .with_context(|| format!("reading page {}", 3))
            .unwrap_err();
        assert!(err.to_string().starts_with("reading page 3:"));
    }
}
