//! The message forwarding worker shell.
//!
//! Owns the configuration, the backend handle, the HTTP client, and both
//! correlation stores, and wires incoming envelopes into the delivery
//! pipeline. One long-lived instance is constructed at startup and shared
//! by `Arc`; each inbound message runs in its own independent tokio task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use courier_core::MessageEnvelope;

use crate::delivery::DeliveryPipeline;
use crate::storage::{CorrelationStore, KeyValueBackend, StoreError};

use super::config::WorkerConfig;
use super::lifecycle::WorkerLifecycle;

/// Consumes inbound messages and forwards each to the configured HTTP
/// endpoint, keeping every message correlatable for its TTL window.
///
/// Messages arrive through the mpsc receiver handed to [`Self::run`] -- the
/// seam where the queueing transport plugs in. Delivery order across
/// messages is unconstrained; each message's store-write strictly precedes
/// its POST.
pub struct MessageForwardingWorker {
    config: WorkerConfig,
    inbounds: Arc<CorrelationStore>,
    outbounds: Arc<CorrelationStore>,
    pipeline: Arc<DeliveryPipeline>,
    lifecycle: Arc<WorkerLifecycle>,
}

impl MessageForwardingWorker {
    /// Builds the worker: correlation stores over the shared backend, one
    /// HTTP client bound by the configured request timeout, and the
    /// delivery pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        config: WorkerConfig,
        backend: Arc<dyn KeyValueBackend>,
    ) -> anyhow::Result<Self> {
        let inbounds = Arc::new(CorrelationStore::inbound(
            Arc::clone(&backend),
            config.inbound_ttl,
        ));
        let outbounds = Arc::new(CorrelationStore::outbound(
            backend,
            config.outbound_ttl,
        ));

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let pipeline = Arc::new(DeliveryPipeline::new(client, Arc::clone(&inbounds)));

        Ok(Self {
            config,
            inbounds,
            outbounds,
            pipeline,
            lifecycle: Arc::new(WorkerLifecycle::new()),
        })
    }

    /// Connects the configured Redis backend and builds the worker over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the Redis connection or the HTTP client cannot
    /// be established.
    #[cfg(feature = "redis")]
    pub async fn connect(config: WorkerConfig) -> anyhow::Result<Self> {
        let backend =
            Arc::new(crate::storage::RedisBackend::connect(&config.backend.url).await?);
        Self::new(config, backend)
    }

    /// The store holding inbound messages awaiting replies.
    #[must_use]
    pub fn inbounds(&self) -> Arc<CorrelationStore> {
        Arc::clone(&self.inbounds)
    }

    /// The store holding outbound messages awaiting delivery events.
    #[must_use]
    pub fn outbounds(&self) -> Arc<CorrelationStore> {
        Arc::clone(&self.outbounds)
    }

    /// The lifecycle handle, for callers coordinating shutdown externally.
    #[must_use]
    pub fn lifecycle(&self) -> Arc<WorkerLifecycle> {
        Arc::clone(&self.lifecycle)
    }

    /// Spawns an independent task handling one inbound message.
    ///
    /// The task stores the message, POSTs it, and logs the classified
    /// outcome. A store failure aborts that message only; other in-flight
    /// messages are unaffected.
    pub fn consume_inbound(&self, message: MessageEnvelope) -> JoinHandle<()> {
        let pipeline = Arc::clone(&self.pipeline);
        let endpoint = self.config.mo_message_url.clone();
        let guard = self.lifecycle.in_flight_guard();

        tokio::spawn(async move {
            let _guard = guard;
            let outcome = pipeline
                .handle_inbound(&message.channel_id, &message, &endpoint)
                .await;
            match outcome {
                // Delivery failures were already logged with diagnostics
                // inside the pipeline; the outcome is terminal here.
                Ok(_) => {}
                Err(err) => {
                    error!(
                        message_id = %message.message_id,
                        channel_id = %message.channel_id,
                        error = %err,
                        "inbound message could not be stored; delivery skipped"
                    );
                }
            }
        })
    }

    /// Records an outbound reply/notification so later delivery events can
    /// be correlated back to it.
    ///
    /// # Errors
    ///
    /// `StoreError` if the outbound store write fails.
    pub async fn record_outbound(
        &self,
        channel_id: &str,
        message: &MessageEnvelope,
    ) -> Result<(), StoreError> {
        self.outbounds.store_message(channel_id, message).await
    }

    /// Consumes envelopes until the channel closes or shutdown triggers.
    ///
    /// Each received envelope is handed to [`Self::consume_inbound`]; the
    /// loop itself never blocks on a delivery.
    pub async fn run(&self, mut receiver: mpsc::Receiver<MessageEnvelope>) {
        let mut shutdown = self.lifecycle.shutdown_receiver();
        loop {
            tokio::select! {
                maybe = receiver.recv() => match maybe {
                    Some(message) => {
                        // Detached: the lifecycle guard tracks completion.
                        let _ = self.consume_inbound(message);
                    }
                    None => {
                        info!("message channel closed; consume loop ending");
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    info!("shutdown triggered; consume loop ending");
                    break;
                }
            }
        }
    }

    /// Triggers shutdown and waits for in-flight deliveries to drain.
    ///
    /// Returns `true` if everything drained within `timeout`. In-flight
    /// tasks always finish their current store/POST step; they are never
    /// aborted mid-write.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.lifecycle.trigger_shutdown();
        self.lifecycle.wait_for_drain(timeout).await
    }
}
