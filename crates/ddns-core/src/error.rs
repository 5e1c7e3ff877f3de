//! Error types for the DDNS system
//!
//! This module defines all error types used throughout the crate.
//!
//! A missing record is not an error: provider lookups return
//! [`RecordLookup::NotFound`](crate::record::RecordLookup::NotFound) instead.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Connection, timeout or name-resolution failure on an outbound call
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success status from the IP echo service or another plain HTTP endpoint
    #[error("HTTP error {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Context for the failed request
        message: String,
    },

    /// The DNS provider refused the request (bad credentials, malformed query, ...)
    #[error("Provider {provider} rejected request (status {status}): {message}")]
    ProviderRejection {
        /// Provider name
        provider: String,
        /// HTTP status code returned by the provider
        status: u16,
        /// Error message
        message: String,
    },

    /// A response that could not be interpreted (carries the raw text)
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The discover-or-create cycle could not establish a record
    #[error("Failed to initialize DNS record after {attempts} attempt(s) ({failures} failed): {last_error}")]
    InitializationFailed {
        /// Attempts made
        attempts: usize,
        /// Attempts that ended in a failure
        failures: usize,
        /// Description of the last failure
        last_error: String,
    },

    /// Cancellation was requested before the operation finished
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an HTTP status error
    pub fn http(status: u16, msg: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: msg.into(),
        }
    }

    /// Create a provider rejection error
    pub fn provider_rejection(
        provider: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderRejection {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(raw: impl Into<String>) -> Self {
        Self::InvalidResponse(raw.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the failure is expected to clear up on its own
    ///
    /// Transient failures consume a retry during initialization and skip
    /// a single tick during steady state.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Http { .. } | Self::InvalidResponse(_)
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
