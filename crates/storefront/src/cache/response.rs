//! Read-through response caching with HTTP freshness metadata.
//!
//! The process tier is consulted first as a fast local mirror; the
//! distributed tier (when configured) is the cross-instance primary. A
//! distributed hit refreshes the local mirror. Invalidation removes keys
//! from both tiers; a race between a stale read and a concurrent
//! invalidation is resolved by TTL expiry, never by blocking.
//!
//! Duplicate concurrent misses for the same key may each invoke `compute()`
//! - there is no single-flight de-duplication. That is acceptable because
//! `compute()` is always a read-only, idempotent query; single-flight
//! locking keyed by cache key is a possible refinement if duplicate load
//! ever matters.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::distributed::DistributedCache;
use super::process::ProcessCache;

/// Freshness class for a cached response.
///
/// `ttl` bounds how long a cached value is served; `stale_while_revalidate`
/// is advertised to HTTP caches so they can serve a slightly expired value
/// while recomputing in the background, avoiding thundering-herd refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    pub ttl: Duration,
    pub stale_while_revalidate: Duration,
}

impl FreshnessPolicy {
    /// Short TTL for listings that rotate with randomized sampling.
    pub const LISTING: Self = Self::new(60, 600);

    /// Medium TTL for relatively static entity reads.
    pub const ENTITY: Self = Self::new(300, 3600);

    /// Per-user reads (cart, checkout summary, orders): short TTL, since
    /// these are invalidated explicitly on the writes we control.
    pub const PER_USER: Self = Self::new(120, 600);

    /// Create a policy from TTL and stale-while-revalidate windows in seconds.
    #[must_use]
    pub const fn new(ttl_seconds: u64, stale_seconds: u64) -> Self {
        Self {
            ttl: Duration::from_secs(ttl_seconds),
            stale_while_revalidate: Duration::from_secs(stale_seconds),
        }
    }

    /// Render the `Cache-Control` header value for this policy.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!(
            "public, max-age={}, stale-while-revalidate={}",
            self.ttl.as_secs(),
            self.stale_while_revalidate.as_secs()
        )
    }
}

/// Whether a read-through result came from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// `true` when the value was served from cache.
    #[must_use]
    pub const fn from_cache(self) -> bool {
        matches!(self, Self::Hit)
    }

    /// Value for the `x-cache` response header.
    #[must_use]
    pub const fn header_value(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
        }
    }
}

/// Layered read-through cache used by every cache-bearing read endpoint.
#[derive(Clone)]
pub struct ResponseCache {
    process: ProcessCache,
    distributed: Option<DistributedCache>,
}

impl ResponseCache {
    /// Create a response cache over the process tier and an optional
    /// distributed tier.
    #[must_use]
    pub fn new(distributed: Option<DistributedCache>) -> Self {
        Self {
            process: ProcessCache::new(),
            distributed,
        }
    }

    /// Look up `key`; on miss, invoke `compute`, store the result, and
    /// return it.
    ///
    /// `compute` errors propagate unchanged: a real data error is never
    /// masked by the cache, and "not found" stays distinguishable from
    /// "cache unavailable". An undecodable cached payload is discarded and
    /// treated as a miss.
    ///
    /// # Errors
    ///
    /// Returns whatever error `compute` returns.
    pub async fn read_through<T, E, F, Fut>(
        &self,
        key: &str,
        policy: FreshnessPolicy,
        compute: F,
    ) -> Result<(T, CacheStatus), E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(payload) = self.lookup(key, policy.ttl).await {
            match serde_json::from_str(&payload) {
                Ok(value) => return Ok((value, CacheStatus::Hit)),
                Err(e) => {
                    warn!(key, error = %e, "Discarding undecodable cache entry");
                    self.invalidate(&[key.to_string()]).await;
                }
            }
        }

        let value = compute().await?;

        match serde_json::to_string(&value) {
            Ok(payload) => self.store(key, &payload, policy.ttl).await,
            Err(e) => warn!(key, error = %e, "Failed to serialize value for caching"),
        }

        Ok((value, CacheStatus::Miss))
    }

    /// Delete the given keys from both tiers.
    ///
    /// Distributed-tier failures are logged inside the tier and otherwise
    /// ignored: a stale entry self-heals at its next TTL expiry, so this is
    /// a performance concern, not a correctness one.
    pub async fn invalidate(&self, keys: &[String]) {
        self.process.remove(keys).await;

        if let Some(distributed) = &self.distributed {
            for key in keys {
                distributed.delete(key).await;
            }
        }
    }

    /// Drop everything from both tiers (catalog import purge).
    pub async fn purge_all(&self) {
        self.process.clear().await;

        if let Some(distributed) = &self.distributed {
            distributed.delete_by_pattern("*").await;
        }
    }

    async fn lookup(&self, key: &str, ttl: Duration) -> Option<String> {
        if let Some(payload) = self.process.get(key).await {
            return Some(payload);
        }

        if let Some(distributed) = &self.distributed
            && let Some(payload) = distributed.get(key).await
        {
            // Refresh the local mirror so the next read on this node is local.
            self.process.insert(key, payload.clone(), ttl).await;
            return Some(payload);
        }

        None
    }

    async fn store(&self, key: &str, payload: &str, ttl: Duration) {
        if let Some(distributed) = &self.distributed {
            distributed.set_with_ttl(key, payload, ttl.as_secs()).await;
        }

        self.process.insert(key, payload.to_string(), ttl).await;
    }
}
