//! Store-before-send delivery of inbound messages.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use tracing::{debug, warn};

use courier_core::MessageEnvelope;

use crate::storage::{CorrelationStore, StoreError};
use super::outcome::DeliveryOutcome;

/// Forwards one inbound message as one HTTP POST, recording it first.
///
/// Holds shared handles only: the HTTP client and the inbound store are
/// owned by the worker shell for the process lifetime. The pipeline itself
/// is stateless, so any number of per-message tasks can run it
/// concurrently.
pub struct DeliveryPipeline {
    client: reqwest::Client,
    inbounds: Arc<CorrelationStore>,
}

impl DeliveryPipeline {
    /// Creates a pipeline over the shared HTTP client and inbound store.
    #[must_use]
    pub fn new(client: reqwest::Client, inbounds: Arc<CorrelationStore>) -> Self {
        Self { client, inbounds }
    }

    /// Handles one inbound message: store, serialize, POST, classify.
    ///
    /// The store write happens before the POST is issued, so a crash or
    /// timeout mid-delivery cannot lose correlation data. Delivery failures
    /// are classified into the returned [`DeliveryOutcome`] and logged; the
    /// stored record is never rolled back and nothing is retried here.
    ///
    /// # Errors
    ///
    /// `StoreError` if the message cannot be stored or serialized. In that
    /// case no POST is attempted, preserving the store-before-send
    /// invariant.
    pub async fn handle_inbound(
        &self,
        channel_id: &str,
        message: &MessageEnvelope,
        endpoint: &Url,
    ) -> Result<DeliveryOutcome, StoreError> {
        self.inbounds.store_message(channel_id, message).await?;

        let payload = serde_json::to_vec(message)?;

        let sent = self
            .client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload.clone())
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    message_id = %message.message_id,
                    channel_id,
                    endpoint = %endpoint,
                    error = %err,
                    "could not reach message endpoint"
                );
                return Ok(DeliveryOutcome::Transport {
                    error: err.to_string(),
                });
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!(
                message_id = %message.message_id,
                channel_id,
                %status,
                "message forwarded"
            );
            return Ok(DeliveryOutcome::Success { status });
        }

        // The response arrived, so this stays an HTTP rejection even if the
        // body stream breaks while we read the diagnostics.
        let body = response.text().await.unwrap_or_default();
        warn!(
            message_id = %message.message_id,
            channel_id,
            %status,
            body = %body,
            message = %String::from_utf8_lossy(&payload),
            "endpoint rejected message"
        );
        Ok(DeliveryOutcome::HttpRejected { status, body })
    }
}
