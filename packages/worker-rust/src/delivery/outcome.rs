//! Classification of a single delivery attempt.

use http::StatusCode;

/// Result of one outbound HTTP request derived from a stored message.
///
/// Ephemeral; never persisted. The attempt is classified, logged where it
/// failed, and handed back to the caller. Retry policy lives outside this
/// crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The endpoint answered with a 2xx status.
    Success {
        /// The exact 2xx status returned.
        status: StatusCode,
    },
    /// The endpoint answered with a non-2xx status.
    HttpRejected {
        /// The rejecting status.
        status: StatusCode,
        /// Response body, kept for diagnostics.
        body: String,
    },
    /// The request could not be completed at all (connection refused,
    /// timeout, DNS failure).
    Transport {
        /// Human-readable description of the network-level failure.
        error: String,
    },
}

impl DeliveryOutcome {
    /// Whether the attempt was accepted by the endpoint.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_2xx_counts_as_success() {
        assert!(DeliveryOutcome::Success {
            status: StatusCode::NO_CONTENT
        }
        .is_success());

        assert!(!DeliveryOutcome::HttpRejected {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "server error".into(),
        }
        .is_success());

        assert!(!DeliveryOutcome::Transport {
            error: "connection refused".into(),
        }
        .is_success());
    }
}
