//! Inbound and outbound correlation stores.
//!
//! Each [`CorrelationStore`] is a [`TtlStore`] specialization bound at
//! construction to a fixed TTL and a [`StoreKind`]. The kind discriminator
//! is part of every key's namespace, so inbound and outbound records for the
//! same message id never collide on a shared backend.
//!
//! Records expire rather than being swept: after the reply window passes, a
//! late event matching an old inbound message finds nothing and cannot
//! resurrect a semantically stale correlation.

use std::sync::Arc;
use std::time::Duration;

use courier_core::MessageEnvelope;

use super::backend::KeyValueBackend;
use super::ttl_store::{StoreError, TtlStore};

/// Which direction of traffic a store holds. Becomes the namespace
/// discriminator in every composed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Messages received from the transport, kept for the reply window.
    Inbound,
    /// Messages sent toward the transport, kept for the event window.
    Outbound,
}

impl StoreKind {
    fn discriminator(self) -> &'static str {
        match self {
            Self::Inbound => "inbound_messages",
            Self::Outbound => "outbound_messages",
        }
    }
}

/// Message store with a fixed TTL, keyed by `(channel_id, message_id)`.
///
/// Stored envelopes are owned by the store once written; lookups return
/// fresh deserialized copies. The TTL is fixed at construction and applied
/// to every write.
#[derive(Clone)]
pub struct CorrelationStore {
    store: TtlStore,
    kind: StoreKind,
    ttl: Duration,
}

impl CorrelationStore {
    /// Creates the inbound-message store with the given reply-window TTL.
    #[must_use]
    pub fn inbound(backend: Arc<dyn KeyValueBackend>, ttl: Duration) -> Self {
        Self {
            store: TtlStore::new(backend),
            kind: StoreKind::Inbound,
            ttl,
        }
    }

    /// Creates the outbound-message store with the given event-window TTL.
    #[must_use]
    pub fn outbound(backend: Arc<dyn KeyValueBackend>, ttl: Duration) -> Self {
        Self {
            store: TtlStore::new(backend),
            kind: StoreKind::Outbound,
            ttl,
        }
    }

    /// The TTL applied to every record written through this store.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn namespace(&self, channel_id: &str) -> String {
        format!("{channel_id}:{}", self.kind.discriminator())
    }

    /// Writes `message` under its own `message_id`, scoped to `channel_id`.
    ///
    /// Storing the same id again overwrites the record and resets its
    /// expiry.
    ///
    /// # Errors
    ///
    /// `StoreError` if serialization fails or the backend is unavailable.
    pub async fn store_message(
        &self,
        channel_id: &str,
        message: &MessageEnvelope,
    ) -> Result<(), StoreError> {
        self.store
            .set(
                &self.namespace(channel_id),
                &message.message_id,
                message,
                self.ttl,
            )
            .await
    }

    /// Looks up a previously stored message.
    ///
    /// Returns `Ok(None)` if the record was never stored, was removed, or
    /// has expired.
    ///
    /// # Errors
    ///
    /// `StoreError` for backend or decode failures.
    pub async fn load_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<Option<MessageEnvelope>, StoreError> {
        self.store.get(&self.namespace(channel_id), message_id).await
    }

    /// Removes a record once its correlation has been consumed.
    ///
    /// A no-op if the record already expired.
    ///
    /// # Errors
    ///
    /// `StoreError::Backend` if the backend is unavailable.
    pub async fn remove_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), StoreError> {
        self.store
            .delete(&self.namespace(channel_id), message_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryBackend;

    fn backend() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::new())
    }

    #[tokio::test]
    async fn store_then_load_round_trips_envelope() {
        let store = CorrelationStore::inbound(backend(), Duration::from_secs(60));
        let message = MessageEnvelope::new("chan1")
            .with_content("hello")
            .with_addresses("+27820001001", "+27820001002");

        store.store_message("chan1", &message).await.unwrap();

        let loaded = store
            .load_message("chan1", &message.message_id)
            .await
            .unwrap();
        assert_eq!(loaded, Some(message));
    }

    #[tokio::test]
    async fn unknown_message_id_loads_as_none() {
        let store = CorrelationStore::inbound(backend(), Duration::from_secs(60));
        let loaded = store.load_message("chan1", "no-such-id").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn record_is_unretrievable_after_ttl() {
        let store = CorrelationStore::inbound(backend(), Duration::from_secs(120));
        let message = MessageEnvelope::new("chan1");

        store.store_message("chan1", &message).await.unwrap();

        tokio::time::advance(Duration::from_secs(119)).await;
        assert!(store
            .load_message("chan1", &message.message_id)
            .await
            .unwrap()
            .is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(store
            .load_message("chan1", &message.message_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn storing_same_id_twice_is_last_write_wins() {
        let store = CorrelationStore::inbound(backend(), Duration::from_secs(60));
        let first = MessageEnvelope::new("chan1").with_content("first");
        let mut second = first.clone();
        second.content = Some("second".into());

        store.store_message("chan1", &first).await.unwrap();
        store.store_message("chan1", &second).await.unwrap();

        let loaded = store
            .load_message("chan1", &first.message_id)
            .await
            .unwrap();
        assert_eq!(loaded.unwrap().content.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn inbound_and_outbound_share_backend_without_collision() {
        let shared = backend();
        let inbounds =
            CorrelationStore::inbound(shared.clone(), Duration::from_secs(60));
        let outbounds =
            CorrelationStore::outbound(shared, Duration::from_secs(60));

        let inbound = MessageEnvelope::new("chan1").with_content("in");
        let mut outbound = inbound.clone();
        outbound.content = Some("out".into());

        inbounds.store_message("chan1", &inbound).await.unwrap();
        outbounds.store_message("chan1", &outbound).await.unwrap();

        let loaded_in = inbounds
            .load_message("chan1", &inbound.message_id)
            .await
            .unwrap();
        let loaded_out = outbounds
            .load_message("chan1", &outbound.message_id)
            .await
            .unwrap();
        assert_eq!(loaded_in.unwrap().content.as_deref(), Some("in"));
        assert_eq!(loaded_out.unwrap().content.as_deref(), Some("out"));
    }

    #[tokio::test]
    async fn channels_are_isolated() {
        let shared = backend();
        let store = CorrelationStore::inbound(shared, Duration::from_secs(60));
        let message = MessageEnvelope::new("chan1");

        store.store_message("chan1", &message).await.unwrap();

        let other_channel = store
            .load_message("chan2", &message.message_id)
            .await
            .unwrap();
        assert!(other_channel.is_none());
    }

    #[tokio::test]
    async fn remove_message_consumes_the_correlation() {
        let store = CorrelationStore::inbound(backend(), Duration::from_secs(60));
        let message = MessageEnvelope::new("chan1");

        store.store_message("chan1", &message).await.unwrap();
        store
            .remove_message("chan1", &message.message_id)
            .await
            .unwrap();

        assert!(store
            .load_message("chan1", &message.message_id)
            .await
            .unwrap()
            .is_none());

        // Removing an already-gone record is a no-op.
        store
            .remove_message("chan1", &message.message_id)
            .await
            .unwrap();
    }
}
