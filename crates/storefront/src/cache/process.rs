//! In-process cache tier backed by `moka`.
//!
//! Entries carry their own absolute expiry so callers can pick a TTL per
//! insert (different data classes have different freshness needs). Expired
//! entries are evicted lazily on the read that finds them; moka's capacity
//! bound and a backstop TTL reclaim entries that are never read again.

use std::time::{Duration, Instant};

use moka::future::Cache;

/// Maximum number of cached responses held in memory.
const MAX_ENTRIES: u64 = 10_000;

/// Backstop eviction for entries no reader ever touches again.
const BACKSTOP_TTL: Duration = Duration::from_secs(3600);

#[derive(Clone)]
struct CachedEntry {
    payload: String,
    expires_at: Instant,
}

/// Single-node, TTL-expiring key/value cache.
///
/// Never errors; absence is always a valid outcome.
#[derive(Clone)]
pub struct ProcessCache {
    entries: Cache<String, CachedEntry>,
}

impl ProcessCache {
    /// Create a new process cache.
    #[must_use]
    pub fn new() -> Self {
        let entries = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(BACKSTOP_TTL)
            .build();

        Self { entries }
    }

    /// Look up a key, evicting it if its expiry has passed.
    pub async fn get(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key).await?;

        if entry.expires_at <= Instant::now() {
            self.entries.invalidate(key).await;
            return None;
        }

        Some(entry.payload)
    }

    /// Store a payload under `key` for `ttl`.
    pub async fn insert(&self, key: impl Into<String>, payload: String, ttl: Duration) {
        let entry = CachedEntry {
            payload,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key.into(), entry).await;
    }

    /// Delete the given keys. Keys that are absent are ignored.
    pub async fn remove(&self, keys: &[String]) {
        for key in keys {
            self.entries.invalidate(key).await;
        }
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
    }
}

impl Default for ProcessCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = ProcessCache::new();
        assert_eq!(cache.get("k").await, None);

        cache
            .insert("k", "v".to_string(), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("k").await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_lazy_expiry_on_read() {
        let cache = ProcessCache::new();
        cache
            .insert("k", "v".to_string(), Duration::from_millis(20))
            .await;

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_per_call_ttl() {
        let cache = ProcessCache::new();
        cache
            .insert("short", "a".to_string(), Duration::from_millis(20))
            .await;
        cache
            .insert("long", "b".to_string(), Duration::from_secs(60))
            .await;

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("short").await, None);
        assert_eq!(cache.get("long").await, Some("b".to_string()));
    }

    #[tokio::test]
    async fn test_remove_is_precise() {
        let cache = ProcessCache::new();
        let ttl = Duration::from_secs(60);
        cache.insert("checkout:1", "a".to_string(), ttl).await;
        cache.insert("checkout:2", "b".to_string(), ttl).await;
        cache.insert("product:mug", "c".to_string(), ttl).await;

        cache.remove(&["checkout:1".to_string()]).await;

        assert_eq!(cache.get("checkout:1").await, None);
        assert_eq!(cache.get("checkout:2").await, Some("b".to_string()));
        assert_eq!(cache.get("product:mug").await, Some("c".to_string()));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let cache = ProcessCache::new();
        let ttl = Duration::from_secs(60);
        cache.insert("k", "old".to_string(), ttl).await;
        cache.insert("k", "new".to_string(), ttl).await;
        assert_eq!(cache.get("k").await, Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = ProcessCache::new();
        cache
            .insert("k", "v".to_string(), Duration::from_secs(60))
            .await;
        cache.clear().await;
        assert_eq!(cache.get("k").await, None);
    }
}
