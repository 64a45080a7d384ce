use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use super::{InMemoryRateLimitStore, RateLimitStore, WindowHit};

const KEY_PREFIX: &str = "campus:ratelimit";

/// Fixed windows shared by every instance through Redis. Each window gets its
/// own key, bumped and given a TTL in one atomic `INCR` + `EXPIRE`.
/// Falls back to process-local counting while Redis is unreachable.
pub struct RedisRateLimitStore {
    client: redis::Client,
    fallback: InMemoryRateLimitStore,
}

impl RedisRateLimitStore {
    pub fn new(client: redis::Client, fallback: InMemoryRateLimitStore) -> Self {
        Self { client, fallback }
    }

    async fn hit_redis(&self, token: &str, window: Duration) -> redis::RedisResult<WindowHit> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let slot = WindowSlot::at(now, window);
        let key = slot.key(token);
        let ttl = i64::try_from(slot.secs).unwrap_or(i64::MAX);

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let (count, _): (u64, bool) = redis::pipe()
            .atomic()
            .incr(&key, 1u64)
            .expire(&key, ttl)
            .query_async(&mut conn)
            .await?;
        Ok(WindowHit {
            count,
            resets_in: slot.resets_in,
        })
    }
}

/// The fixed window a moment falls into, aligned to the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowSlot {
    index: u64,
    secs: u64,
    resets_in: Duration,
}

impl WindowSlot {
    fn at(since_epoch: Duration, window: Duration) -> Self {
        let secs = window.as_secs().max(1);
        let window_start = Duration::from_secs(since_epoch.as_secs() / secs * secs);
        Self {
            index: since_epoch.as_secs() / secs,
            secs,
            resets_in: (window_start + Duration::from_secs(secs)).saturating_sub(since_epoch),
        }
    }

    fn key(&self, token: &str) -> String {
        format!("{KEY_PREFIX}:{token}:{}", self.index)
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn hit(&self, token: &str, window: Duration) -> WindowHit {
        match self.hit_redis(token, window).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!("redis rate-limit fallback: {e}");
                self.fallback.hit(token, window).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_per_token_and_window() {
        let window = Duration::from_secs(60);
        let slot = WindowSlot::at(Duration::from_secs(125), window);
        assert_eq!(slot.key("ana@campus.test"), "campus:ratelimit:ana@campus.test:2");
        assert_eq!(slot.resets_in, Duration::from_secs(55));
    }

    #[test]
    fn crossing_a_boundary_moves_to_a_fresh_key() {
        let window = Duration::from_secs(60);
        let last = WindowSlot::at(Duration::from_millis(119_999), window);
        let next = WindowSlot::at(Duration::from_secs(120), window);
        assert_ne!(last.key("ana"), next.key("ana"));
        assert_eq!(next.resets_in, window);
        assert!(last.resets_in <= Duration::from_millis(1));
    }

    #[test]
    fn sub_second_windows_round_up_to_one_second() {
        let slot = WindowSlot::at(Duration::from_secs(10), Duration::from_millis(200));
        assert_eq!(slot.secs, 1);
        assert_eq!(slot.index, 10);
    }

    #[tokio::test]
    async fn unreachable_redis_falls_back_to_memory() {
        // Port 1 is never a Redis server; the connection attempt fails fast.
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        let store = RedisRateLimitStore::new(client, InMemoryRateLimitStore::new(100));
        let window = Duration::from_secs(60);
        assert_eq!(store.hit("ana", window).await.count, 1);
        assert_eq!(store.hit("ana", window).await.count, 2);
    }
}
