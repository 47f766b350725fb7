use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use super::store::CacheStore;
use crate::config::RedisConfig;
use crate::Result;
use crate::WellbeingError;

/// Keys deleted per `DEL` round trip
const DELETE_BATCH: usize = 500;

/// Keys requested per `SCAN` iteration
const SCAN_COUNT: usize = 200;

#[derive(Clone)]
pub struct RedisCacheStore {
    client: redis::Client,
    namespace: String,
}

fn unavailable(op: &str, e: &redis::RedisError) -> WellbeingError {
    WellbeingError::CacheUnavailable(format!("Redis {op} error: {e}"))
}

impl RedisCacheStore {
    pub fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| WellbeingError::ConfigError(format!("Redis open error: {e}")))?;

        Ok(Self {
            client,
            namespace: config.namespace.clone(),
        })
    }

    fn key(&self, k: &str) -> String {
        format!("{}{}", self.namespace, k)
    }

    fn strip_namespace<'a>(&self, k: &'a str) -> &'a str {
        k.strip_prefix(self.namespace.as_str()).unwrap_or(k)
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| unavailable("connect", &e))
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let k = self.key(key);
        let mut conn = self.connection().await?;
        let val: Option<String> = conn.get(k).await.map_err(|e| unavailable("GET", &e))?;
        Ok(val)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let k = self.key(key);
        let mut conn = self.connection().await?;
        // EXPIRE 0 would delete the key immediately
        let secs = ttl.as_secs().max(1) as i64;
        redis::pipe()
            .set(&k, value)
            .ignore()
            .expire(&k, secs)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| unavailable("SET/EXPIRE", &e))?;
        Ok(())
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>> {
        let full_pattern = self.key(pattern);
        let mut conn = self.connection().await?;
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&full_pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await
                .map_err(|e| unavailable("SCAN", &e))?;
            keys.extend(batch.iter().map(|k| self.strip_namespace(k).to_string()));
            if next == 0 {
                break;
            }
            cursor = next;
        }
        // SCAN may return a key more than once
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<usize> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection().await?;
        let mut removed = 0usize;
        for chunk in keys.chunks(DELETE_BATCH) {
            let full: Vec<String> = chunk.iter().map(|k| self.key(k)).collect();
            let n: usize = conn.del(full).await.map_err(|e| unavailable("DEL", &e))?;
            removed += n;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RedisConfig {
        RedisConfig {
            url: "redis://127.0.0.1:6379".to_string(),
            namespace: "wellbeing:".to_string(),
        }
    }

    #[test]
    fn test_namespacing() {
        // Client::open only parses the URL, no connection is made
        let store = RedisCacheStore::connect(&config()).unwrap();
        assert_eq!(store.key("leaderboard:all"), "wellbeing:leaderboard:all");
        assert_eq!(
            store.strip_namespace("wellbeing:leaderboard:all"),
            "leaderboard:all"
        );
        assert_eq!(store.strip_namespace("other"), "other");
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let mut cfg = config();
        cfg.url = "not a url".to_string();
        assert!(matches!(
            RedisCacheStore::connect(&cfg),
            Err(WellbeingError::ConfigError(_))
        ));
    }
}
