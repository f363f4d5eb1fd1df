//! Drain-aware worker lifecycle.
//!
//! Shutdown must let in-flight deliveries finish their store/POST sequence
//! rather than abort them mid-write: an aborted task could leave a POST
//! without its stored record. The lifecycle pairs a watch-channel shutdown
//! signal with an atomic in-flight counter tracked by RAII guards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::watch;

/// Worker lifecycle state.
///
/// State machine: Running -> Draining -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Accepting messages and spawning delivery tasks.
    Running,
    /// No new messages accepted; in-flight deliveries completing.
    Draining,
    /// All in-flight deliveries have completed.
    Stopped,
}

/// Coordinates shutdown across the consume loop and per-message tasks.
#[derive(Debug)]
pub struct WorkerLifecycle {
    shutdown_signal: watch::Sender<bool>,
    in_flight: Arc<AtomicU64>,
    state: ArcSwap<WorkerState>,
}

impl WorkerLifecycle {
    /// Creates a lifecycle in the `Running` state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            shutdown_signal: tx,
            in_flight: Arc::new(AtomicU64::new(0)),
            state: ArcSwap::from_pointee(WorkerState::Running),
        }
    }

    /// Returns a receiver notified when shutdown is triggered.
    ///
    /// The consume loop selects on this alongside the message channel.
    #[must_use]
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_signal.subscribe()
    }

    /// Moves to `Draining` and signals all shutdown receivers.
    ///
    /// New messages should be rejected after this; in-flight deliveries
    /// keep running.
    pub fn trigger_shutdown(&self) {
        self.state.store(Arc::new(WorkerState::Draining));
        // Ignore send errors -- receivers may have been dropped
        let _ = self.shutdown_signal.send(true);
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> WorkerState {
        **self.state.load()
    }

    /// Creates an RAII guard tracking one in-flight delivery.
    ///
    /// The counter is decremented when the guard drops, even if the
    /// delivery task panics.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Current number of in-flight deliveries.
    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Waits for in-flight deliveries to complete, up to `timeout`.
    ///
    /// Returns `true` once the count reaches zero (state becomes
    /// `Stopped`); `false` if the deadline passes first (state stays
    /// `Draining`).
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if self.in_flight.load(Ordering::Relaxed) == 0 {
                self.state.store(Arc::new(WorkerState::Stopped));
                return true;
            }

            if tokio::time::Instant::now() >= deadline {
                return false;
            }

            // Poll at 10ms intervals to avoid busy-waiting
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Default for WorkerLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard that decrements the in-flight counter when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running_with_no_in_flight() {
        let lifecycle = WorkerLifecycle::new();
        assert_eq!(lifecycle.state(), WorkerState::Running);
        assert_eq!(lifecycle.in_flight_count(), 0);
    }

    #[test]
    fn trigger_shutdown_moves_to_draining() {
        let lifecycle = WorkerLifecycle::new();
        lifecycle.trigger_shutdown();
        assert_eq!(lifecycle.state(), WorkerState::Draining);
    }

    #[test]
    fn guards_track_in_flight_deliveries() {
        let lifecycle = WorkerLifecycle::new();

        let first = lifecycle.in_flight_guard();
        let second = lifecycle.in_flight_guard();
        assert_eq!(lifecycle.in_flight_count(), 2);

        drop(first);
        assert_eq!(lifecycle.in_flight_count(), 1);
        drop(second);
        assert_eq!(lifecycle.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn shutdown_receiver_is_notified() {
        let lifecycle = WorkerLifecycle::new();
        let mut rx = lifecycle.shutdown_receiver();

        assert!(!*rx.borrow());
        lifecycle.trigger_shutdown();

        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn drain_completes_when_guards_release() {
        let lifecycle = WorkerLifecycle::new();
        let guard = lifecycle.in_flight_guard();
        lifecycle.trigger_shutdown();

        let release = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(guard);
        });

        assert!(lifecycle.wait_for_drain(Duration::from_secs(2)).await);
        assert_eq!(lifecycle.state(), WorkerState::Stopped);

        release.await.unwrap();
    }

    #[tokio::test]
    async fn drain_times_out_while_deliveries_remain() {
        let lifecycle = WorkerLifecycle::new();
        let _guard = lifecycle.in_flight_guard();
        lifecycle.trigger_shutdown();

        assert!(!lifecycle.wait_for_drain(Duration::from_millis(50)).await);
        assert_eq!(lifecycle.state(), WorkerState::Draining);
    }
}
