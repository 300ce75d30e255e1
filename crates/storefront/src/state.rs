//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::warn;

use crate::cache::{DistributedCache, ResponseCache};
use crate::config::StorefrontConfig;
use crate::services::{NotificationClient, SignatureVerifier};

/// Prefix namespacing every distributed cache key.
const CACHE_KEY_PREFIX: &str = "marigold";

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and the response cache.
/// Constructed once at startup; the cache instance lives for the whole
/// process and is only ever reset by explicit invalidation calls.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    cache: ResponseCache,
    verifier: SignatureVerifier,
    notifier: NotificationClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// A Redis URL that fails to parse only disables the distributed cache
    /// tier: the cache is an optimization, never a startup dependency.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let distributed = config.redis_url.as_deref().and_then(|url| {
            match DistributedCache::connect_lazy(url, CACHE_KEY_PREFIX) {
                Ok(cache) => Some(cache),
                Err(e) => {
                    warn!(error = %e, "Invalid REDIS_URL, running with process cache only");
                    None
                }
            }
        });

        let cache = ResponseCache::new(distributed);
        let verifier = SignatureVerifier::new(config.razorpay.key_secret.clone());
        let notifier = NotificationClient::new(config.notify_webhook_url.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                cache,
                verifier,
                notifier,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the layered response cache.
    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    /// Get a reference to the payment signature verifier.
    #[must_use]
    pub fn verifier(&self) -> &SignatureVerifier {
        &self.inner.verifier
    }

    /// Get a reference to the notification client.
    #[must_use]
    pub fn notifier(&self) -> &NotificationClient {
        &self.inner.notifier
    }
}
