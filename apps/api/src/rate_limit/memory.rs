use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{RateLimitStore, WindowHit};

#[derive(Debug, Clone)]
struct Window {
    count: u64,
    started: Instant,
}

/// Process-local fixed-window counters. Lost on restart.
pub struct InMemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
    sweep_threshold: usize,
}

impl InMemoryRateLimitStore {
    /// `sweep_threshold` is the table size above which stale windows are dropped.
    pub fn new(sweep_threshold: usize) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            sweep_threshold,
        }
    }

    pub async fn tracked_tokens(&self) -> usize {
        self.windows.lock().await.len()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn hit(&self, token: &str, window: Duration) -> WindowHit {
        let now = Instant::now();
        let mut lock = self.windows.lock().await;

        if lock.len() > self.sweep_threshold {
            let before = lock.len();
            lock.retain(|_, w| now.duration_since(w.started) < window);
            tracing::debug!(swept = before - lock.len(), "swept stale rate limit windows");
        }

        let entry = lock.entry(token.to_string()).or_insert_with(|| Window {
            count: 0,
            started: now,
        });
        if now.duration_since(entry.started) >= window {
            entry.count = 0;
            entry.started = now;
        }
        entry.count += 1;
        WindowHit {
            count: entry.count,
            resets_in: window.saturating_sub(now.duration_since(entry.started)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn hit_counts_within_window() {
        let store = InMemoryRateLimitStore::new(100);
        let window = Duration::from_secs(10);
        assert_eq!(store.hit("a", window).await.count, 1);
        assert_eq!(store.hit("a", window).await.count, 2);
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(store.hit("a", window).await.count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn resets_in_counts_down_from_window_start() {
        let store = InMemoryRateLimitStore::new(100);
        let window = Duration::from_secs(10);
        assert_eq!(store.hit("a", window).await.resets_in, window);
        tokio::time::advance(Duration::from_secs(7)).await;
        assert_eq!(store.hit("a", window).await.resets_in, Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_drops_only_stale_windows_past_threshold() {
        let store = InMemoryRateLimitStore::new(2);
        let window = Duration::from_secs(10);
        store.hit("old-1", window).await;
        store.hit("old-2", window).await;
        store.hit("old-3", window).await;
        assert_eq!(store.tracked_tokens().await, 3);

        tokio::time::advance(Duration::from_secs(5)).await;
        store.hit("fresh", window).await;
        // Nothing was stale yet, so the sweep kept everything.
        assert_eq!(store.tracked_tokens().await, 4);

        tokio::time::advance(Duration::from_secs(6)).await;
        store.hit("newest", window).await;
        let remaining = store.tracked_tokens().await;
        assert_eq!(remaining, 2, "only 'fresh' and 'newest' should survive");
    }

    #[tokio::test(start_paused = true)]
    async fn small_table_is_not_swept() {
        let store = InMemoryRateLimitStore::new(10);
        let window = Duration::from_secs(1);
        store.hit("a", window).await;
        tokio::time::advance(Duration::from_secs(5)).await;
        store.hit("b", window).await;
        assert_eq!(store.tracked_tokens().await, 2);
    }
}
