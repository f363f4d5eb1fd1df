//! Forwarding of inbound messages to the configured HTTP endpoint.
//!
//! [`DeliveryPipeline`] turns one inbound message into one outbound HTTP
//! notification with store-before-send ordering; [`DeliveryOutcome`] is the
//! classified result of a single attempt.

pub mod outcome;
pub mod pipeline;

pub use outcome::DeliveryOutcome;
pub use pipeline::DeliveryPipeline;
