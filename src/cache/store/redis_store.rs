//! Redis-backed store.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::CacheStore;
use crate::cache::{CacheConfig, MAX_TTL_SECS, StoreError};

/// [`CacheStore`] over a single shared Redis connection.
///
/// The connection is opened by whichever operation needs it first; later
/// operations reuse it. [`ConnectionManager`] multiplexes commands and
/// reconnects on its own, so no pooling happens here.
pub struct RedisStore {
    client: Client,
    conn: OnceCell<ConnectionManager>,
}

impl RedisStore {
    /// Creates a store that connects on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Redis`] if the client cannot be built from the
    /// configured address. No network traffic happens here.
    pub fn new(config: &CacheConfig) -> Result<Self, StoreError> {
        let client = Client::open(connection_info(config))?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
        })
    }

    /// Creates a store and opens its connection immediately.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Redis`] if the server cannot be reached.
    pub async fn connect(config: &CacheConfig) -> Result<Self, StoreError> {
        let store = Self::new(config)?;
        store.connection().await?;
        Ok(store)
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let conn = ConnectionManager::new(self.client.clone()).await?;
                info!(addr = ?self.client.get_connection_info().addr, "cache store connected");
                Ok::<_, StoreError>(conn)
            })
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let seconds = i64::try_from(ttl_secs)
            .ok()
            .filter(|_| ttl_secs <= MAX_TTL_SECS)
            .ok_or_else(|| StoreError::InvalidTtl {
                key: key.to_owned(),
                ttl_secs,
            })?;
        let mut conn = self.connection().await?;
        let applied: bool = conn.expire(key, seconds).await?;

        if applied {
            Ok(())
        } else {
            debug!(key, "expire found no key");
            Err(StoreError::Vanished {
                key: key.to_owned(),
            })
        }
    }
}

fn connection_info(config: &CacheConfig) -> ConnectionInfo {
    ConnectionInfo {
        addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
        redis: RedisConnectionInfo {
            db: config.options.database,
            username: config.options.username.clone(),
            password: config.options.password.clone(),
            ..Default::default()
        },
    }
}
