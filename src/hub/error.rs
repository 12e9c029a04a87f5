//! Hub error types

use thiserror::Error;

/// Errors returned by the hub handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    /// The hub loop has stopped and no longer accepts events
    #[error("Hub event loop is not running")]
    Closed,
}

/// Errors raised by a transport while reading or writing a message
#[derive(Error, Debug)]
pub enum TransportError {
    /// Reading the next message failed
    #[error("Transport read failed: {0}")]
    Read(String),

    /// Writing a message failed
    #[error("Transport write failed: {0}")]
    Write(String),
}

/// Result type alias for hub operations
pub type HubResult<T> = Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(HubError::Closed.to_string(), "Hub event loop is not running");

        let err = TransportError::Read("connection reset".to_string());
        assert_eq!(err.to_string(), "Transport read failed: connection reset");
    }
}
