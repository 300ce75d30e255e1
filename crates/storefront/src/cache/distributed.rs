//! Distributed cache tier backed by Redis.
//!
//! The connection is established lazily and the whole tier is optional:
//! when Redis is unconfigured or unreachable, every operation degrades to
//! "miss" / "failed" without erroring. Callers must treat this cache purely
//! as an optimization, never as a correctness dependency.
//!
//! Every command is bounded by a timeout and retried a fixed number of
//! times; beyond that the tier is treated as unavailable for the current
//! call and the next call starts over.

use std::sync::Arc;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::OnceCell;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Transport-level retry bound.
const MAX_ATTEMPTS: u32 = 3;

/// Timeout for establishing the initial connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Timeout per single-key command attempt.
const OP_TIMEOUT: Duration = Duration::from_millis(800);

/// Timeout for a whole pattern delete (SCAN + DEL).
const PATTERN_TIMEOUT: Duration = Duration::from_secs(5);

struct Inner {
    client: Client,
    conn: OnceCell<ConnectionManager>,
    key_prefix: String,
}

/// Redis-backed key/value cache with TTL and pattern delete.
#[derive(Clone)]
pub struct DistributedCache {
    inner: Arc<Inner>,
}

impl DistributedCache {
    /// Create a cache client without connecting.
    ///
    /// The connection is established on first use; a node that never becomes
    /// reachable just makes every call a miss.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., redis://localhost:6379)
    /// * `key_prefix` - Prefix for all keys
    ///
    /// # Errors
    ///
    /// Returns `redis::RedisError` if the URL cannot be parsed.
    pub fn connect_lazy(url: &str, key_prefix: &str) -> Result<Self, redis::RedisError> {
        let client = Client::open(url)?;

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                conn: OnceCell::new(),
                key_prefix: key_prefix.to_string(),
            }),
        })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.inner.key_prefix, key)
    }

    /// Get (or establish) the shared connection. `None` means the tier is
    /// unavailable for this call; the next call will try again.
    async fn connection(&self) -> Option<ConnectionManager> {
        let result = self
            .inner
            .conn
            .get_or_try_init(|| async {
                let conn = timeout(
                    CONNECT_TIMEOUT,
                    ConnectionManager::new(self.inner.client.clone()),
                )
                .await
                .map_err(|_| {
                    redis::RedisError::from((redis::ErrorKind::IoError, "connect timed out"))
                })??;
                info!("Connected to Redis cache");
                Ok::<_, redis::RedisError>(conn)
            })
            .await;

        match result {
            Ok(conn) => Some(conn.clone()),
            Err(e) => {
                debug!(error = %e, "Redis unavailable, treating as cache miss");
                None
            }
        }
    }

    /// Look up a key. Absence, unavailability, and timeout all read as `None`.
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.connection().await?;
        let full_key = self.full_key(key);

        for attempt in 1..=MAX_ATTEMPTS {
            match timeout(OP_TIMEOUT, conn.get::<_, Option<String>>(&full_key)).await {
                Ok(Ok(value)) => return value,
                Ok(Err(e)) if attempt < MAX_ATTEMPTS => {
                    debug!(key = %full_key, attempt, error = %e, "Redis GET failed, retrying");
                }
                Ok(Err(e)) => {
                    warn!(key = %full_key, error = %e, "Redis GET failed, treating as miss");
                }
                Err(_) if attempt < MAX_ATTEMPTS => {
                    debug!(key = %full_key, attempt, "Redis GET timed out, retrying");
                }
                Err(_) => {
                    warn!(key = %full_key, "Redis GET timed out, treating as miss");
                }
            }
        }

        None
    }

    /// Store a payload under `key` with a TTL in seconds.
    ///
    /// Returns `false` when the write did not take; callers lose nothing but
    /// a warm cache.
    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        let full_key = self.full_key(key);

        for attempt in 1..=MAX_ATTEMPTS {
            match timeout(
                OP_TIMEOUT,
                conn.set_ex::<_, _, ()>(&full_key, value, ttl_seconds),
            )
            .await
            {
                Ok(Ok(())) => return true,
                Ok(Err(e)) if attempt < MAX_ATTEMPTS => {
                    debug!(key = %full_key, attempt, error = %e, "Redis SETEX failed, retrying");
                }
                Ok(Err(e)) => {
                    warn!(key = %full_key, error = %e, "Redis SETEX failed");
                }
                Err(_) if attempt < MAX_ATTEMPTS => {
                    debug!(key = %full_key, attempt, "Redis SETEX timed out, retrying");
                }
                Err(_) => {
                    warn!(key = %full_key, "Redis SETEX timed out");
                }
            }
        }

        false
    }

    /// Delete a key. Returns `false` when the delete did not take.
    pub async fn delete(&self, key: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        let full_key = self.full_key(key);

        for attempt in 1..=MAX_ATTEMPTS {
            match timeout(OP_TIMEOUT, conn.del::<_, ()>(&full_key)).await {
                Ok(Ok(())) => return true,
                Ok(Err(e)) if attempt < MAX_ATTEMPTS => {
                    debug!(key = %full_key, attempt, error = %e, "Redis DEL failed, retrying");
                }
                Ok(Err(e)) => {
                    warn!(key = %full_key, error = %e, "Redis DEL failed");
                }
                Err(_) if attempt < MAX_ATTEMPTS => {
                    debug!(key = %full_key, attempt, "Redis DEL timed out, retrying");
                }
                Err(_) => {
                    warn!(key = %full_key, "Redis DEL timed out");
                }
            }
        }

        false
    }

    /// Delete every key matching a glob pattern (SCAN + DEL, non-blocking).
    ///
    /// Returns `false` when the purge did not fully take; a partial purge
    /// self-heals at TTL expiry.
    pub async fn delete_by_pattern(&self, pattern: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        let full_pattern = self.full_key(pattern);

        match timeout(PATTERN_TIMEOUT, scan_and_delete(&mut conn, &full_pattern)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(pattern = %full_pattern, error = %e, "Redis pattern delete failed");
                false
            }
            Err(_) => {
                warn!(pattern = %full_pattern, "Redis pattern delete timed out");
                false
            }
        }
    }
}

/// Collect keys matching `pattern` and delete them in one DEL.
async fn scan_and_delete(
    conn: &mut ConnectionManager,
    pattern: &str,
) -> Result<(), redis::RedisError> {
    let keys: Vec<String> = {
        let mut iter = conn.scan_match::<_, String>(pattern).await?;
        let mut keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        keys
    };

    if keys.is_empty() {
        return Ok(());
    }

    conn.del::<_, ()>(&keys).await
}
