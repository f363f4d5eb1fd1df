//! Worker configuration, validated once at startup.

use std::time::Duration;

use reqwest::Url;

/// Connection configuration for the key-value backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Connection URL, e.g. `redis://127.0.0.1:6379/0`.
    pub url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/0".to_string(),
        }
    }
}

/// Errors from validating the configuration surface.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `mo_message_url` did not parse as an absolute URL.
    #[error("mo_message_url {url:?} is not an absolute URL")]
    InvalidEndpointUrl {
        /// The offending value.
        url: String,
    },

    /// `mo_message_url` parsed, but with a scheme this worker cannot POST to.
    #[error("mo_message_url scheme must be http or https, got {scheme:?}")]
    UnsupportedScheme {
        /// The offending scheme.
        scheme: String,
    },

    /// A TTL was configured as zero seconds.
    #[error("{field} must be a positive number of seconds")]
    ZeroTtl {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Static configuration for the message forwarding worker.
///
/// All fields are validated by [`Self::new`] before the worker starts;
/// nothing is re-validated per message.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Endpoint that receives every inbound message as a JSON POST.
    pub mo_message_url: Url,
    /// Key-value backend connection configuration.
    pub backend: BackendConfig,
    /// How long inbound messages stay correlatable (the reply window).
    pub inbound_ttl: Duration,
    /// How long outbound messages stay correlatable (the event window).
    pub outbound_ttl: Duration,
    /// Upper bound on a single delivery POST, including connect time.
    pub request_timeout: Duration,
}

impl WorkerConfig {
    /// Default bound on a single delivery POST.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Validates and assembles the configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the endpoint URL is not absolute http/https or
    /// either TTL is zero.
    pub fn new(
        mo_message_url: &str,
        backend: BackendConfig,
        inbound_ttl_secs: u64,
        outbound_ttl_secs: u64,
    ) -> Result<Self, ConfigError> {
        let url = Url::parse(mo_message_url).map_err(|_| ConfigError::InvalidEndpointUrl {
            url: mo_message_url.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ConfigError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                })
            }
        }
        if inbound_ttl_secs == 0 {
            return Err(ConfigError::ZeroTtl {
                field: "inbound_ttl",
            });
        }
        if outbound_ttl_secs == 0 {
            return Err(ConfigError::ZeroTtl {
                field: "outbound_ttl",
            });
        }

        Ok(Self {
            mo_message_url: url,
            backend,
            inbound_ttl: Duration::from_secs(inbound_ttl_secs),
            outbound_ttl: Duration::from_secs(outbound_ttl_secs),
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Overrides the per-request delivery timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
