//! Cache-aside caching for aggregate queries
//!
//! [`CacheAside`] wraps any [`CacheStore`]: Redis in production, the
//! `DashMap`-backed [`MemoryCacheStore`] in tests or when Redis is not configured.

pub mod accessor;
pub mod memory;
pub mod redis_store;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

pub use accessor::CacheAside;
pub use accessor::CacheStats;
pub use memory::MemoryCacheStore;
pub use redis_store::RedisCacheStore;
pub use store::glob_match;
pub use store::CacheStore;

use crate::config::RedisConfig;
use crate::Result;

/// How often the in-memory store drops expired entries
pub const MEMORY_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Build the configured store: Redis when a URL is set, in-memory otherwise.
///
/// Inside a tokio runtime the in-memory store also gets its background
/// cleanup task.
pub fn store_from_config(config: &RedisConfig) -> Result<Arc<dyn CacheStore>> {
    if config.url.trim().is_empty() {
        info!("No Redis URL configured, using in-memory cache store");
        let store = MemoryCacheStore::new();
        if tokio::runtime::Handle::try_current().is_ok() {
            store.start_cleanup_task(MEMORY_CLEANUP_INTERVAL);
        }
        Ok(Arc::new(store))
    } else {
        info!("Using Redis cache store (namespace: {})", config.namespace);
        Ok(Arc::new(RedisCacheStore::connect(config)?))
    }
}
