//! The message envelope exchanged between the transport and the HTTP sink.
//!
//! [`MessageEnvelope`] is the unit of storage and forwarding. Its
//! `serde_json` serialization is the wire contract with the receiving
//! endpoint: a stable, versionable field set. Fields are emitted in
//! declaration order; additions go at the end.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A single message flowing through the system.
///
/// Created once when a message arrives from the transport, then owned by the
/// correlation store after it is written. The envelope is opaque to the
/// storage layer; only `message_id` and `channel_id` participate in key
/// composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Stable unique identifier, generated as a UUID v4 by [`Self::new`].
    pub message_id: String,

    /// Channel (transport) this message arrived on. Scopes correlation keys.
    pub channel_id: String,

    /// Identifier of the message this one replies to, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reply_to: Option<String>,

    /// Destination address on the transport.
    pub to: Option<String>,

    /// Origin address on the transport.
    pub from: Option<String>,

    /// Message body.
    pub content: Option<String>,

    /// Wall-clock time (millis since epoch) when the envelope was created.
    pub timestamp: i64,

    /// Channel-specific structured payload, passed through untouched.
    #[serde(default)]
    pub channel_data: serde_json::Value,
}

impl MessageEnvelope {
    /// Creates an envelope with a fresh UUID v4 `message_id` and the current
    /// wall-clock timestamp. Address, content, and payload fields start empty.
    #[must_use]
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            message_id: uuid::Uuid::new_v4().to_string(),
            channel_id: channel_id.into(),
            reply_to: None,
            to: None,
            from: None,
            content: None,
            timestamp: unix_millis_now(),
            channel_data: serde_json::Value::Null,
        }
    }

    /// Sets the message body.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the destination and origin transport addresses.
    #[must_use]
    pub fn with_addresses(
        mut self,
        to: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        self.to = Some(to.into());
        self.from = Some(from.into());
        self
    }

    /// Marks this envelope as a reply to an earlier message.
    #[must_use]
    pub fn with_reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.reply_to = Some(message_id.into());
        self
    }

    /// Attaches channel-specific structured payload.
    #[must_use]
    pub fn with_channel_data(mut self, data: serde_json::Value) -> Self {
        self.channel_data = data;
        self
    }
}

/// Current wall-clock time as millis since the Unix epoch.
fn unix_millis_now() -> i64 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    // Comfortably within i64 range until year ~292 million.
    #[allow(clippy::cast_possible_truncation)]
    let millis = elapsed.as_millis() as i64;
    millis
}
