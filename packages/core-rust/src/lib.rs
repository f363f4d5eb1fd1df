//! Courier Core — message envelope and the JSON wire contract shared with
//! HTTP integration endpoints.

pub mod envelope;

pub use envelope::MessageEnvelope;

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
