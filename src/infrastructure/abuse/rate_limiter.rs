//! Rate limiter implementation
//!
//! Sliding window request throttling per client identity.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::domain::abuse::ClientIdentity;
use crate::domain::{Clock, SystemClock};

/// Result of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Total limit for the window
    pub limit: u32,
    /// Time until the limit resets (in seconds)
    pub reset_in_seconds: u64,
}

/// Rate limiter keyed by client identity
#[derive(Debug)]
pub struct RateLimiter {
    /// Per-identity request timestamps
    records: Arc<RwLock<HashMap<ClientIdentity, Vec<DateTime<Utc>>>>>,
    limit: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    cleanup_interval: Duration,
    last_cleanup: Arc<RwLock<DateTime<Utc>>>,
}

impl RateLimiter {
    /// Allow `limit` requests per `window` for each identity
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            limit,
            window,
            clock: Arc::new(SystemClock),
            cleanup_interval: Duration::minutes(5),
            last_cleanup: Arc::new(RwLock::new(Utc::now())),
        }
    }

    /// Create with a custom time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.last_cleanup = Arc::new(RwLock::new(clock.now()));
        self.clock = clock;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Check and record in one operation. Refused requests are not recorded.
    pub async fn check_and_record(&self, identity: &ClientIdentity) -> RateLimitResult {
        self.maybe_cleanup().await;

        let now = self.clock.now();
        let window_start = now - self.window;
        let mut records = self.records.write().await;
        let timestamps = records.entry(identity.clone()).or_default();

        timestamps.retain(|t| *t > window_start);
        let count = timestamps.len() as u32;

        if count >= self.limit {
            let reset_in = timestamps
                .iter()
                .min()
                .map(|oldest| (*oldest + self.window - now).num_seconds().max(0) as u64)
                .unwrap_or_else(|| self.window.num_seconds().max(0) as u64);

            return RateLimitResult {
                allowed: false,
                remaining: 0,
                limit: self.limit,
                reset_in_seconds: reset_in,
            };
        }

        timestamps.push(now);

        RateLimitResult {
            allowed: true,
            remaining: self.limit - count - 1,
            limit: self.limit,
            reset_in_seconds: self.window.num_seconds().max(0) as u64,
        }
    }

    /// Reset rate limits for an identity
    pub async fn reset(&self, identity: &ClientIdentity) {
        let mut records = self.records.write().await;
        records.remove(identity);
    }

    async fn maybe_cleanup(&self) {
        let now = self.clock.now();

        {
            let last = self.last_cleanup.read().await;

            if now - *last < self.cleanup_interval {
                return;
            }
        }

        *self.last_cleanup.write().await = now;

        let window_start = now - self.window;
        let mut records = self.records.write().await;

        records.retain(|_, timestamps| {
            timestamps.retain(|t| *t > window_start);
            !timestamps.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ManualClock;

    fn client(value: &str) -> ClientIdentity {
        ClientIdentity::new(value).unwrap()
    }

    fn create_limiter(limit: u32) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let limiter = RateLimiter::new(limit, Duration::seconds(60)).with_clock(clock.clone());
        (limiter, clock)
    }

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let (limiter, _) = create_limiter(10);
        let ip = client("1.2.3.4");

        for i in 0..10 {
            let result = limiter.check_and_record(&ip).await;
            assert!(result.allowed);
            assert_eq!(result.remaining, 9 - i);
        }

        let refused = limiter.check_and_record(&ip).await;
        assert!(!refused.allowed);
        assert_eq!(refused.remaining, 0);
        assert_eq!(refused.reset_in_seconds, 60);
    }

    #[tokio::test]
    async fn test_window_slides() {
        let (limiter, clock) = create_limiter(2);
        let ip = client("1.2.3.4");

        limiter.check_and_record(&ip).await;
        clock.advance(Duration::seconds(30));
        limiter.check_and_record(&ip).await;

        assert!(!limiter.check_and_record(&ip).await.allowed);

        clock.advance(Duration::seconds(31));
        assert!(limiter.check_and_record(&ip).await.allowed);
    }

    #[tokio::test]
    async fn test_identities_are_independent() {
        let (limiter, _) = create_limiter(1);

        assert!(limiter.check_and_record(&client("1.1.1.1")).await.allowed);
        assert!(limiter.check_and_record(&client("2.2.2.2")).await.allowed);
        assert!(!limiter.check_and_record(&client("1.1.1.1")).await.allowed);
    }

    #[tokio::test]
    async fn test_reset() {
        let (limiter, _) = create_limiter(1);
        let ip = client("1.2.3.4");

        limiter.check_and_record(&ip).await;
        limiter.reset(&ip).await;

        assert!(limiter.check_and_record(&ip).await.allowed);
    }

    #[tokio::test]
    async fn test_cleanup_drops_idle_identities() {
        let (limiter, clock) = create_limiter(5);

        limiter.check_and_record(&client("1.1.1.1")).await;
        clock.advance(Duration::minutes(10));
        limiter.check_and_record(&client("2.2.2.2")).await;

        let records = limiter.records.read().await;
        assert!(!records.contains_key(&client("1.1.1.1")));
        assert!(records.contains_key(&client("2.2.2.2")));
    }
}
