//! In-memory [`KeyValueBackend`] implementation backed by [`DashMap`].
//!
//! Provides concurrent read/write access without external locking. Expiry
//! is checked lazily against `tokio::time::Instant` on every read, so tests
//! running under tokio's paused clock can simulate the passage of TTL time
//! with `tokio::time::advance`.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use super::backend::KeyValueBackend;

/// A stored value together with its absolute expiry deadline.
#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory backend suitable for development and testing.
///
/// Expired entries are dropped lazily when read; there is no background
/// sweeper. This matches the visibility contract (`get` on an expired key is
/// a miss) without spending a task on cleanup.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: DashMap<String, Entry>,
}

impl MemoryBackend {
    /// Creates a new, empty `MemoryBackend`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of entries currently held, including not-yet-collected
    /// expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the backend holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> anyhow::Result<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let now = Instant::now();
        let hit = self
            .entries
            .get(key)
            .map(|entry| (!entry.is_expired(now)).then(|| entry.value.clone()));
        match hit {
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => {
                // Collect lazily, but only if the entry was not overwritten
                // between the read above and this removal.
                self.entries.remove_if(key, |_, entry| entry.is_expired(now));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn del(&self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
