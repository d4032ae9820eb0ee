pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;

/// Byte-oriented key/value cache with per-entry TTL. Expiry is fixed at
/// write time; an expired entry is never returned.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
