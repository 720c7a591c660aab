use super::CacheStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Redis-backed cache
///
/// Keys are stored as given; the callers already namespace them
/// (`pii:`, `prefetch:`, `user_dna:`).
pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    /// Create a cache for `redis_url`
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid
    pub fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(|e| Error::Cache(e.to_string()))?;
        Ok(Self { client })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::Cache(format!("Redis connection failed: {e}")))
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::Cache(format!("Redis GET failed: {e}")))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.get_connection().await?;
        match ttl {
            Some(ttl) => redis::cmd("SETEX")
                .arg(key)
                .arg(ttl.as_secs().max(1))
                .arg(value)
                .query_async::<()>(&mut conn)
                .await
                .map_err(|e| Error::Cache(format!("Redis SETEX failed: {e}")))?,
            None => redis::cmd("SET")
                .arg(key)
                .arg(value)
                .query_async::<()>(&mut conn)
                .await
                .map_err(|e| Error::Cache(format!("Redis SET failed: {e}")))?,
        }
        debug!(key = %key, ttl_secs = ttl.map(|t| t.as_secs()), "Cache entry written");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| Error::Cache(format!("Redis PING failed: {e}")))
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
// Requires a running Redis: cargo test --features redis-tests
#[cfg(feature = "redis-tests")]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_redis_round_trip() {
        let cache = RedisCache::new("redis://127.0.0.1:6379").unwrap();
        cache.ping().await.unwrap();
        cache
            .set("cortex:test:key", "value", Some(Duration::from_secs(5)))
            .await
            .unwrap();
        assert_eq!(
            cache.get("cortex:test:key").await.unwrap().as_deref(),
            Some("value")
        );
    }
}
