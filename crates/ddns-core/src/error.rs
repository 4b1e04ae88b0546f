//! Error types for the DDNS system
//!
//! Every failure a reconciliation pass can hit is one of these variants.
//! The scheduler catches all of them at the pass boundary, so none of them
//! is ever fatal to the process.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Public IP lookup failed
    #[error("IP resolution failed: {0}")]
    Resolution(String),

    /// Record listing call failed
    #[error("Record lookup failed: {0}")]
    Lookup(String),

    /// Create/update call failed at the transport level
    #[error("Record mutation failed: {0}")]
    Mutation(String),

    /// Create/update call returned a non-empty outcome code
    #[error("Record mutation rejected: code={code}, message={message}")]
    Rejected {
        /// Provider error code
        code: String,
        /// Provider error message
        message: String,
    },

    /// Provider answered with a non-2xx status and an error body
    #[error("API error ({code}): {message}")]
    Api {
        /// Provider error code
        code: String,
        /// Provider error message
        message: String,
    },

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local I/O errors (config file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an IP resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a record lookup error
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Create a transport-level mutation error
    pub fn mutation(msg: impl Into<String>) -> Self {
        Self::Mutation(msg.into())
    }

    /// Create a provider-rejected mutation error
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a provider API error
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Whether this failure comes from configuration rather than the network
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display_carries_code_and_message() {
        let err = Error::rejected("DomainRecordDuplicate", "The DNS record already exists.");
        let text = err.to_string();
        assert!(text.contains("DomainRecordDuplicate"));
        assert!(text.contains("already exists"));
    }

    #[test]
    fn test_is_config() {
        assert!(Error::config("TTL must be > 0").is_config());
        assert!(!Error::resolution("timeout").is_config());
    }
}
