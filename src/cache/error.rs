//! Cache error types.

use thiserror::Error;

use crate::StatusCode;

/// Errors reported by a [`CacheStore`](super::CacheStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// `expire` found no key to apply the TTL to.
    #[error("key {key} vanished before its TTL could be applied")]
    Vanished { key: String },

    /// The store cannot represent a TTL this long.
    #[error("TTL of {ttl_secs}s for key {key} is out of range")]
    InvalidTtl { key: String, ttl_secs: u64 },
}

/// Errors produced by the lookup and persistence stages.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store error: {0}")]
    Store(#[from] StoreError),

    #[error("cached headers could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("handler failed with {status}; response not cached")]
    Upstream { status: StatusCode },
}
