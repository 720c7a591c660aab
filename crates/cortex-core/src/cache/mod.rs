//! Key-value cache with TTL
//!
//! Shared by the PII mapping store, the prefetcher and user profiles.
//! Backends: in-process ([`InMemoryCache`]) and Redis ([`RedisCache`]).

mod memory_cache;
mod redis_cache;


pub use memory_cache::InMemoryCache;
pub use redis_cache::RedisCache;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// String key-value store
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value; `None` when missing or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, optionally expiring after `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Check connectivity
    async fn ping(&self) -> Result<()>;

    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;
}
