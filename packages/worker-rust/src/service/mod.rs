//! Worker shell: configuration, lifecycle, and the consume loop.
//!
//! Everything here is glue around the core in `storage` and `delivery`:
//!
//! 1. **Configuration** (`config`): validated once at startup
//! 2. **Lifecycle** (`lifecycle`): drain-aware shutdown coordination
//! 3. **Worker** (`worker`): owns the shared resources and spawns one task
//!    per inbound message

pub mod config;
pub mod lifecycle;
pub mod worker;

pub use config::{BackendConfig, ConfigError, WorkerConfig};
pub use lifecycle::{InFlightGuard, WorkerLifecycle, WorkerState};
pub use worker::MessageForwardingWorker;
