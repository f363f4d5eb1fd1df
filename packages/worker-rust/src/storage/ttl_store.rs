//! Generic namespaced set/get/delete with JSON serialization and per-write
//! expiry, layered over a [`KeyValueBackend`].

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::backend::KeyValueBackend;

/// Errors surfaced by the storage layer.
///
/// Not-found is never an error; `get` returns `Ok(None)` for absent or
/// expired records.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying key-value backend could not be reached.
    #[error("key-value backend unavailable: {0}")]
    Backend(#[source] anyhow::Error),

    /// A stored value could not be encoded or decoded.
    #[error("stored value codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Namespaced TTL key-value store.
///
/// Values are serialized to JSON and written under the composite key
/// `"{namespace}:{key}"` with an absolute expiry of now + `ttl`. Writes are
/// last-write-wins: storing an existing key overwrites the value and resets
/// its expiry. Clones share the backend handle.
#[derive(Clone)]
pub struct TtlStore {
    backend: Arc<dyn KeyValueBackend>,
}

impl TtlStore {
    /// Creates a store over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Composes the backend key for `key` within `namespace`.
    ///
    /// Collision-free across namespaces as long as `key` contains no `:`
    /// (message ids are UUIDs): the final `:` unambiguously splits the
    /// composite back into its parts. Namespaces themselves may contain `:`.
    fn compose_key(namespace: &str, key: &str) -> String {
        format!("{namespace}:{key}")
    }

    /// Serializes `value` and writes it with an expiry of now + `ttl`.
    ///
    /// # Errors
    ///
    /// `StoreError::Codec` if serialization fails, `StoreError::Backend` if
    /// the backend is unavailable.
    pub async fn set<T: Serialize + Sync>(
        &self,
        namespace: &str,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)?;
        self.backend
            .set_ex(&Self::compose_key(namespace, key), &bytes, ttl)
            .await
            .map_err(StoreError::Backend)
    }

    /// Reads and deserializes the value under `key` in `namespace`.
    ///
    /// Returns `Ok(None)` if the record is absent or has expired.
    ///
    /// # Errors
    ///
    /// `StoreError::Backend` for connectivity failures, `StoreError::Codec`
    /// if the stored bytes do not decode as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        let bytes = self
            .backend
            .get(&Self::compose_key(namespace, key))
            .await
            .map_err(StoreError::Backend)?;
        match bytes {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Removes the record immediately, regardless of remaining TTL.
    ///
    /// A no-op if the record is absent.
    ///
    /// # Errors
    ///
    /// `StoreError::Backend` if the backend is unavailable.
    pub async fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        self.backend
            .del(&Self::compose_key(namespace, key))
            .await
            .map_err(StoreError::Backend)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde::Deserialize;

    use super::*;
    use crate::storage::memory::MemoryBackend;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Payload {
        label: String,
        count: u32,
    }

    fn store() -> TtlStore {
        TtlStore::new(Arc::new(MemoryBackend::new()))
    }

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let store = store();
        let payload = Payload {
            label: "hello".into(),
            count: 7,
        };

        store
            .set("ns", "k1", &payload, Duration::from_secs(60))
            .await
            .unwrap();

        let loaded: Option<Payload> = store.get("ns", "k1").await.unwrap();
        assert_eq!(loaded, Some(payload));
    }

    #[tokio::test]
    async fn absent_key_is_ok_none() {
        let store = store();
        let loaded: Option<Payload> = store.get("ns", "missing").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn delete_is_immediate_and_idempotent() {
        let store = store();
        let payload = Payload {
            label: "gone".into(),
            count: 1,
        };

        store
            .set("ns", "k1", &payload, Duration::from_secs(60))
            .await
            .unwrap();
        store.delete("ns", "k1").await.unwrap();

        let loaded: Option<Payload> = store.get("ns", "k1").await.unwrap();
        assert!(loaded.is_none());

        // Deleting again is a no-op, not an error.
        store.delete("ns", "k1").await.unwrap();
    }

    #[tokio::test]
    async fn same_key_in_different_namespaces_does_not_collide() {
        let store = store();
        let first = Payload {
            label: "first".into(),
            count: 1,
        };
        let second = Payload {
            label: "second".into(),
            count: 2,
        };

        store
            .set("ns-a", "k1", &first, Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set("ns-b", "k1", &second, Duration::from_secs(60))
            .await
            .unwrap();

        let a: Option<Payload> = store.get("ns-a", "k1").await.unwrap();
        let b: Option<Payload> = store.get("ns-b", "k1").await.unwrap();
        assert_eq!(a, Some(first));
        assert_eq!(b, Some(second));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_record_reads_as_none() {
        let store = store();
        let payload = Payload {
            label: "brief".into(),
            count: 1,
        };

        store
            .set("ns", "k1", &payload, Duration::from_secs(30))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;

        let loaded: Option<Payload> = store.get("ns", "k1").await.unwrap();
        assert!(loaded.is_none());
    }

    proptest! {
        // Colon-free keys (message ids are UUIDs) make the composite key
        // unambiguous even when namespaces themselves contain colons.
        #[test]
        fn composite_keys_never_collide(
            ns_a in "[a-z0-9:_-]{1,24}",
            ns_b in "[a-z0-9:_-]{1,24}",
            key_a in "[a-z0-9-]{1,24}",
            key_b in "[a-z0-9-]{1,24}",
        ) {
            prop_assume!((ns_a.clone(), key_a.clone()) != (ns_b.clone(), key_b.clone()));
            prop_assert_ne!(
                TtlStore::compose_key(&ns_a, &key_a),
                TtlStore::compose_key(&ns_b, &key_b)
            );
        }
    }
}
