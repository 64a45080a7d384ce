//! Fixed-window rate limiting keyed by caller token.
//!
//! `RateLimiter` owns an injectable `RateLimitStore`: the in-memory store for
//! tests and single-instance deployments, Redis when instances share limits.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod redis_store;

pub use memory::InMemoryRateLimitStore;
pub use redis_store::RedisRateLimitStore;

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("rate limit of {limit} requests exceeded, window resets in {retry_after:?}")]
    Exceeded { limit: u64, retry_after: Duration },
}

/// State of a token's window right after a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    /// Hits in the current window, including this one.
    pub count: u64,
    /// Time until the current window closes.
    pub resets_in: Duration,
}

/// Counts hits per token inside a fixed window.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Records one hit for `token`. A window that has fully elapsed starts
    /// over at 1.
    async fn hit(&self, token: &str, window: Duration) -> WindowHit;
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    window: Duration,
    default_limit: u64,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, window: Duration, default_limit: u64) -> Self {
        Self {
            store,
            window,
            default_limit,
        }
    }

    /// Fails with `Exceeded` once `token` has made more than `limit` calls in
    /// the current window.
    pub async fn check(&self, limit: u64, token: &str) -> Result<(), RateLimitError> {
        let hit = self.store.hit(token, self.window).await;
        if hit.count > limit {
            tracing::debug!(token, count = hit.count, limit, "rate limit exceeded");
            return Err(RateLimitError::Exceeded {
                limit,
                retry_after: hit.resets_in,
            });
        }
        Ok(())
    }

    /// `check` with the configured per-window limit.
    pub async fn check_default(&self, token: &str) -> Result<(), RateLimitError> {
        self.check(self.default_limit, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(window_secs: u64) -> RateLimiter {
        RateLimiter::new(
            Arc::new(InMemoryRateLimitStore::new(1000)),
            Duration::from_secs(window_secs),
            3,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn calls_up_to_limit_succeed_then_fail() {
        let limiter = limiter(60);
        for _ in 0..3 {
            limiter.check(3, "alice@campus.test").await.unwrap();
        }
        let err = limiter.check(3, "alice@campus.test").await.unwrap_err();
        assert!(matches!(err, RateLimitError::Exceeded { limit: 3, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn counter_resets_after_window() {
        let limiter = limiter(60);
        for _ in 0..3 {
            limiter.check_default("bob@campus.test").await.unwrap();
        }
        assert!(limiter.check_default("bob@campus.test").await.is_err());

        tokio::time::advance(Duration::from_secs(61)).await;
        limiter.check_default("bob@campus.test").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn tokens_are_counted_independently() {
        let limiter = limiter(60);
        for _ in 0..3 {
            limiter.check(3, "carol@campus.test").await.unwrap();
        }
        assert!(limiter.check(3, "carol@campus.test").await.is_err());
        limiter.check(3, "dave@campus.test").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn still_limited_just_before_window_ends() {
        let limiter = limiter(60);
        for _ in 0..3 {
            limiter.check(3, "erin@campus.test").await.unwrap();
        }
        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(limiter.check(3, "erin@campus.test").await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn rejection_reports_time_left_in_window() {
        let limiter = limiter(60);
        for _ in 0..3 {
            limiter.check(3, "finn@campus.test").await.unwrap();
        }
        tokio::time::advance(Duration::from_secs(45)).await;
        let err = limiter.check(3, "finn@campus.test").await.unwrap_err();
        let RateLimitError::Exceeded { retry_after, .. } = err;
        assert_eq!(retry_after, Duration::from_secs(15));
    }
}
