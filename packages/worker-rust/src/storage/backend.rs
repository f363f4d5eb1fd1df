//! Abstract TTL-capable key-value backend.
//!
//! Defines [`KeyValueBackend`], the seam between the correlation stores and
//! whatever actually holds the bytes. Expiry is the backend's job: a `get`
//! on an expired or absent key is a miss, never an error. The stores do not
//! poll or sweep.

use std::time::Duration;

use async_trait::async_trait;

/// Byte-valued key-value backend with per-key expiry.
///
/// Maps directly onto the Redis primitives `SET key value EX seconds`,
/// `GET key`, and `DEL key`. Implementations must be safe for concurrent
/// use; callers share a single instance as `Arc<dyn KeyValueBackend>` for
/// the process lifetime and perform no locking of their own.
///
/// All methods return `Err` only for connectivity-level failures.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Write `value` under `key` with an absolute expiry of now + `ttl`.
    ///
    /// Overwrites any existing record for `key`, resetting its expiry
    /// (last-write-wins).
    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> anyhow::Result<()>;

    /// Read the value under `key`.
    ///
    /// Returns `None` if the key is absent or its record has expired.
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// Remove the record under `key` immediately, regardless of remaining
    /// TTL. A no-op if the key is absent.
    async fn del(&self, key: &str) -> anyhow::Result<()>;
}
