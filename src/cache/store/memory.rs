//! In-process store with Redis-like TTL semantics.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::CacheStore;
use crate::cache::StoreError;

/// [`CacheStore`] kept in a process-local map.
///
/// Mirrors the parts of Redis the cache depends on: `set` clears any TTL,
/// `expire` fails on a missing key, expired keys read as absent. Useful for
/// tests and single-process deployments.
///
/// # Examples
///
/// ```
/// use rttp_cache::cache::{CacheStore, MemoryStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MemoryStore::new();
/// store.set("payload_/", b"hello").await.unwrap();
/// store.expire("payload_/", 60).await.unwrap();
///
/// assert_eq!(store.get("payload_/").await.unwrap(), Some(b"hello".to_vec()));
/// assert!(store.ttl("payload_/").is_some());
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining lifetime of `key`, or `None` if it is absent or has no TTL.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.lock();
        let entry = entries.get(key).filter(|entry| entry.is_live(now))?;
        entry.expires_at.map(|at| at - now)
    }

    /// Returns `true` if `key` holds a live value.
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.lock().get(key).is_some_and(|entry| entry.is_live(now))
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock().values().filter(|entry| entry.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The map stays consistent across a panic, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.lock().insert(
            key.to_owned(),
            Entry {
                value: value.to_vec(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut entries = self.lock();

        let live = entries.get(key).is_some_and(|entry| entry.is_live(now));
        if !live {
            entries.remove(key);
            return Err(StoreError::Vanished {
                key: key.to_owned(),
            });
        }

        if ttl_secs == 0 {
            entries.remove(key);
            return Ok(());
        }

        let expires_at = now
            .checked_add(Duration::from_secs(ttl_secs))
            .ok_or_else(|| StoreError::InvalidTtl {
                key: key.to_owned(),
                ttl_secs,
            })?;
        if let Some(entry) = entries.get_mut(key) {
            entry.expires_at = Some(expires_at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_overwrites_and_clears_ttl() {
        let store = MemoryStore::new();
        store.set("k", b"one").await.unwrap();
        store.expire("k", 30).await.unwrap();
        assert!(store.ttl("k").is_some());

        store.set("k", b"two").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.ttl("k"), None);
    }

    #[tokio::test]
    async fn expire_on_missing_key_is_vanished() {
        let store = MemoryStore::new();
        let err = store.expire("gone", 10).await.unwrap_err();
        assert!(matches!(err, StoreError::Vanished { key } if key == "gone"));
    }

    #[tokio::test]
    async fn zero_ttl_removes_key() {
        let store = MemoryStore::new();
        store.set("k", b"v").await.unwrap();
        store.expire("k", 0).await.unwrap();
        assert!(!store.contains("k"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn ttl_is_bounded_by_requested_seconds() {
        let store = MemoryStore::new();
        store.set("k", b"v").await.unwrap();
        store.expire("k", 120).await.unwrap();

        let remaining = store.ttl("k").unwrap();
        assert!(remaining <= Duration::from_secs(120));
        assert!(remaining > Duration::from_secs(110));
    }

    #[tokio::test]
    async fn unrepresentable_ttl_is_refused() {
        let store = MemoryStore::new();
        store.set("k", b"v").await.unwrap();

        let err = store.expire("k", u64::MAX).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidTtl { ref key, ttl_secs: u64::MAX } if key == "k"));
        assert!(store.contains("k"));
    }

    #[tokio::test]
    async fn entries_expire() {
        let store = MemoryStore::new();
        store.set("k", b"v").await.unwrap();
        store.expire("k", 1).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.len(), 0);
    }
}
