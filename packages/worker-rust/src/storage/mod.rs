//! Time-bounded correlation storage.
//!
//! Three layers, outermost first:
//!
//! - [`CorrelationStore`]: inbound/outbound message stores, each bound to a
//!   fixed TTL and a kind discriminator used in key namespacing
//! - [`TtlStore`]: generic namespaced set/get/delete with JSON
//!   (de)serialization over the backend
//! - [`KeyValueBackend`]: the abstract TTL-capable key-value backend
//!   (`SET .. EX`, `GET`, `DEL`) with backend-enforced expiry
//!
//! [`MemoryBackend`] is the in-process implementation; a Redis-backed
//! implementation is available behind the `redis` cargo feature.

pub mod backend;
pub mod correlation;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;
pub mod ttl_store;

pub use backend::KeyValueBackend;
pub use correlation::{CorrelationStore, StoreKind};
pub use memory::MemoryBackend;
#[cfg(feature = "redis")]
pub use redis::RedisBackend;
pub use ttl_store::{StoreError, TtlStore};
