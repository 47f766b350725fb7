//! Cache-aside accessor for expensive aggregate computations
//!
//! The cache is an optimization only: every store failure is logged and the
//! accessor falls through to the producer. Producer errors are returned as-is
//! and never cached. Concurrent misses on the same key may each run the
//! producer; there is no single-flight.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::store::CacheStore;
use crate::Result;

/// Cache statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub store_errors: u64,
    pub invalidated: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Read-through accessor over an injected [`CacheStore`]
#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn CacheStore>,
    stats: Arc<RwLock<CacheStats>>,
}

impl CacheAside {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    /// Return the cached value for `key`, or run `producer`, cache its
    /// result for `ttl` and return it.
    ///
    /// # Errors
    /// Only the producer's own error; cache failures never surface.
    pub async fn get_or_compute<T, F, Fut>(&self, key: &str, ttl: Duration, producer: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    self.stats.write().await.hits += 1;
                    debug!("Cache hit: {}", key);
                    return Ok(value);
                }
                Err(e) => {
                    warn!("Discarding undecodable cache entry {}: {}", key, e);
                }
            },
            Ok(None) => {
                debug!("Cache miss: {}", key);
            }
            Err(e) => {
                self.stats.write().await.store_errors += 1;
                warn!("Cache get failed for {}: {} - computing directly", key, e);
            }
        }
        self.stats.write().await.misses += 1;

        let value = producer().await?;

        match serde_json::to_string(&value) {
            Ok(json) => {
                if let Err(e) = self.store.set(key, &json, ttl).await {
                    self.stats.write().await.store_errors += 1;
                    warn!("Cache set failed for {}: {}", key, e);
                }
            }
            Err(e) => warn!("Not caching {}: serialization failed: {}", key, e),
        }

        Ok(value)
    }

    /// Delete every key matching `pattern`, returning how many were removed.
    ///
    /// A failing store is logged and reported as zero removals.
    pub async fn invalidate(&self, pattern: &str) -> usize {
        let keys = match self.store.scan_keys(pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                self.stats.write().await.store_errors += 1;
                warn!("Cache scan failed for pattern {}: {}", pattern, e);
                return 0;
            }
        };
        if keys.is_empty() {
            debug!("No cache entries match {}", pattern);
            return 0;
        }

        match self.store.delete_many(&keys).await {
            Ok(removed) => {
                self.stats.write().await.invalidated += removed as u64;
                info!("Invalidated {} cache entries matching {}", removed, pattern);
                removed
            }
            Err(e) => {
                self.stats.write().await.store_errors += 1;
                warn!("Cache delete failed for pattern {}: {}", pattern, e);
                0
            }
        }
    }

    /// Invalidate several patterns, returning the total removed
    pub async fn invalidate_all(&self, patterns: &[&str]) -> usize {
        let mut total = 0;
        for pattern in patterns {
            total += self.invalidate(pattern).await;
        }
        total
    }

    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }
}
