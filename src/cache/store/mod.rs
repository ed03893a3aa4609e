//! Store adapters: the three key-value operations the cache relies on.
//!
//! The cache never talks to Redis directly; it goes through [`CacheStore`]
//! so the hit/miss and write-back logic can run against [`MemoryStore`]
//! in tests and against [`RedisStore`] in production.

mod memory;
mod redis_store;

use async_trait::async_trait;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

use super::StoreError;

/// A networked key-value store offering get/set/expire.
///
/// Implementations hold no caching policy. Each call is independent and may
/// fail with a [`StoreError`]; nothing here retries.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stores `value` under `key`, overwriting any previous value and TTL.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Applies a TTL to an existing key.
    ///
    /// Fails with [`StoreError::Vanished`] if the key no longer exists.
    /// A TTL of zero removes the key.
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), StoreError>;
}
