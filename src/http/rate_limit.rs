//! Client-side request rate limiting
//!
//! The Tracker API does not publish a hard request quota, but it does
//! throttle aggressive clients with 429 responses. A governor token
//! bucket in front of every request keeps the connector polite enough
//! that throttling stays the exception handled by the retry path, not
//! the steady state.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Sustained request rate the connector holds itself to
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

/// Requests allowed to fire back-to-back before pacing kicks in
pub const DEFAULT_BURST_SIZE: u32 = 10;

/// Token bucket parameters
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Bucket capacity for short bursts
    pub burst_size: u32,
}

impl RateLimiterConfig {
    /// Config with an explicit rate and burst capacity
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    /// Governor quota for this config
    ///
    /// Zero values are clamped to one: a bucket that can never refill
    /// or never holds a token would deadlock the fetch loop.
    fn quota(&self) -> Quota {
        let rate = NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rate).allow_burst(burst)
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_SECOND, DEFAULT_BURST_SIZE)
    }
}

/// Token bucket pacing outgoing requests
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Build a limiter from the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            bucket: Arc::new(Governor::direct(config.quota())),
        }
    }

    /// Wait until the next request may be sent
    pub async fn wait(&self) {
        self.bucket.until_ready().await;
    }

    /// Take a token without waiting, if one is available
    pub fn try_acquire(&self) -> bool {
        self.bucket.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;

    #[test]
    fn test_default_config_is_polite() {
        let config = RateLimiterConfig::default();
        assert_eq!(config.requests_per_second, DEFAULT_REQUESTS_PER_SECOND);
        assert_eq!(config.burst_size, DEFAULT_BURST_SIZE);
    }

    #[test]
    fn test_burst_drains_then_denies() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(1, 4));

        for _ in 0..4 {
            assert!(limiter.try_acquire());
        }
        // Bucket is empty and refills at one token per second
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_zero_rate_clamps_instead_of_stalling() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(0, 0));
        assert!(limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_wait_passes_within_burst() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(100, 10));
        limiter.wait().await;
    }
}
