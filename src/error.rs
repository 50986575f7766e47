//! Error types for the forwarder

use thiserror::Error;

/// Result type alias for forwarder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reason a single destination group could not be delivered.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The encoded group could not be marshalled to JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The request could not be built or sent
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote endpoint answered with an unexpected status
    #[error("Delivery rejected: {status}")]
    Rejected {
        /// Status line of the response, e.g. `404 Not Found`
        status: String,
    },
}

/// Main error type for the forwarder
#[derive(Error, Debug)]
pub enum Error {
    /// A batch could not be forwarded to the remote host
    #[error("failed to send message to host: {0}")]
    SaveFailed(#[source] DeliveryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inbound message could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Broker subscription error
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DeliveryError> for Error {
    fn from(err: DeliveryError) -> Self {
        Error::SaveFailed(err)
    }
}

impl Error {
    /// Returns the delivery failure wrapped by `SaveFailed`, if any.
    pub fn delivery(&self) -> Option<&DeliveryError> {
        match self {
            Error::SaveFailed(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("test error".to_string());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_save_failed_wraps_rejection() {
        let err: Error = DeliveryError::Rejected { status: "404 Not Found".to_string() }.into();
        assert_eq!(err.to_string(), "failed to send message to host: Delivery rejected: 404 Not Found");
        assert!(matches!(err.delivery(), Some(DeliveryError::Rejected { .. })));
        assert!(std::error::Error::source(&err).is_some());
    }
}
