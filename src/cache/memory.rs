//! In-process cache store
//!
//! Used in tests and as the fallback backend when no Redis URL is configured.
//! Expiry follows the tokio clock, so paused-time tests can advance past a TTL.

use std::sync::Arc;
use std::sync::Weak;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use super::store::glob_match;
use super::store::CacheStore;
use crate::Result;

/// Cache entry with TTL support
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// `DashMap`-backed cache store
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStore {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_expired()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of stored entries, expired or not
    #[must_use]
    pub fn resident_len(&self) -> usize {
        self.entries.len()
    }

    /// Drop expired entries, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!("Cleaned up {} expired cache entries", removed);
        }
        removed
    }

    /// Start background cleanup task.
    ///
    /// The task holds a weak reference and exits once every clone of the
    /// store has been dropped. Must be called inside a tokio runtime.
    pub fn start_cleanup_task(&self, every: Duration) -> JoinHandle<()> {
        let entries: Weak<DashMap<String, CacheEntry>> = Arc::downgrade(&self.entries);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // First tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                let Some(entries) = entries.upgrade() else {
                    break;
                };
                Self { entries }.cleanup_expired();
            }
        })
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, entry| entry.is_expired());
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries
            .insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        Ok(())
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>> {
        // Expired keys are never returned, so sweep them here instead
        self.cleanup_expired();
        let keys = self
            .entries
            .iter()
            .filter(|e| !e.is_expired() && glob_match(pattern, e.key()))
            .map(|e| e.key().clone())
            .collect();
        Ok(keys)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<usize> {
        let mut removed = 0;
        for key in keys {
            if self.entries.remove(key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
