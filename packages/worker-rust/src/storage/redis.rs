//! Redis-backed [`KeyValueBackend`] implementation.
//!
//! Uses a [`ConnectionManager`], which multiplexes all callers over one
//! connection and reconnects on failure, matching the shared-handle model:
//! the worker shell owns one backend for the process lifetime and every
//! store holds a clone.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::backend::KeyValueBackend;

/// Key-value backend speaking to a Redis server.
///
/// Expiry is fully delegated to Redis (`SET .. EX`): an expired key reads
/// back as a miss, and no sweeping happens on this side.
#[derive(Clone)]
pub struct RedisBackend {
    manager: ConnectionManager,
}

impl RedisBackend {
    /// Connects to the Redis server at `url` (e.g. `redis://127.0.0.1:6379/0`).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the initial connection
    /// cannot be established.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl KeyValueBackend for RedisBackend {
    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> anyhow::Result<()> {
        let mut conn = self.manager.clone();
        // Redis rejects EX 0; sub-second TTLs round up to one second.
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let mut conn = self.manager.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn del(&self, key: &str) -> anyhow::Result<()> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}
