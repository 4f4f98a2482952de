//! Client-side request throttling
//!
//! A governor token bucket shared by every subscription that uses the same
//! client, so concurrent requests to `/beer` together stay under the
//! upstream quota.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Upstream request quota
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimit {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Requests allowed back to back before throttling starts
    #[serde(default = "one")]
    pub burst_size: u32,
}

fn one() -> u32 {
    1
}

impl RateLimit {
    /// Quota of `requests_per_second` with a burst of `burst_size`
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    fn quota(&self) -> Quota {
        // Zero would disable the bucket entirely; treat it as the slowest rate
        let rate = NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rate).allow_burst(burst)
    }
}

/// Shared token bucket
#[derive(Clone)]
pub struct Throttle {
    bucket: Arc<DirectLimiter>,
}

impl Throttle {
    pub fn new(limit: &RateLimit) -> Self {
        Self {
            bucket: Arc::new(RateLimiter::direct(limit.quota())),
        }
    }

    /// Wait for a permit
    ///
    /// Cancellation safe: dropping the future gives nothing back, and takes
    /// nothing either.
    pub async fn acquire(&self) {
        self.bucket.until_ready().await;
    }

    /// Take a permit only if one is available now
    pub fn try_acquire(&self) -> bool {
        self.bucket.check().is_ok()
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").finish_non_exhaustive()
    }
}
