//! Error types for strassen-tree operations.
//!
//! Every fallible path in the engine, the worker loop and the transports
//! reports one of these variants instead of panicking, so a rank can shut
//! down cleanly and the coordinator can surface the cause.

use std::fmt;

/// Errors that can occur while multiplying or exchanging matrices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrassenError {
    /// Input validation error (bad dimension, mismatched operands, bad config).
    ValidationError {
        /// Human-readable error message.
        message: String,
    },
    /// A packet arrived that does not fit the task/result/terminate exchange.
    ProtocolError {
        /// Human-readable error message.
        message: String,
    },
    /// The channel to a peer rank is gone or the rank does not exist.
    CommunicationError {
        /// The peer rank involved in the failed exchange.
        rank: usize,
        /// Human-readable error message.
        message: String,
    },
}

impl fmt::Display for StrassenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrassenError::ValidationError { message } => {
                write!(f, "Validation error: {}", message)
            }
            StrassenError::ProtocolError { message } => {
                write!(f, "Protocol error: {}", message)
            }
            StrassenError::CommunicationError { rank, message } => {
                write!(f, "Communication with rank {} failed: {}", rank, message)
            }
        }
    }
}

impl std::error::Error for StrassenError {}

impl From<bincode::Error> for StrassenError {
    fn from(err: bincode::Error) -> Self {
        protocol_error(format!("malformed packet: {}", err))
    }
}

impl From<ndarray::ShapeError> for StrassenError {
    fn from(err: ndarray::ShapeError) -> Self {
        validation_error(format!("bad matrix shape: {}", err))
    }
}

/// Result type alias for strassen-tree operations.
pub type Result<T> = std::result::Result<T, StrassenError>;

/// Creates a validation error.
pub fn validation_error(message: impl Into<String>) -> StrassenError {
    StrassenError::ValidationError {
        message: message.into(),
    }
}

/// Creates a protocol error.
pub fn protocol_error(message: impl Into<String>) -> StrassenError {
    StrassenError::ProtocolError {
        message: message.into(),
    }
}

/// Creates a communication error for the given peer rank.
pub fn communication_error(rank: usize, message: impl Into<String>) -> StrassenError {
    StrassenError::CommunicationError {
        rank,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = validation_error("matrix size must be a power of two");
        let display = format!("{}", error);
        assert!(display.contains("Validation error"));
        assert!(display.contains("matrix size must be a power of two"));
    }

    #[test]
    fn test_protocol_error_display() {
        let error = protocol_error("unexpected result packet");
        let display = format!("{}", error);
        assert!(display.contains("Protocol error"));
        assert!(display.contains("unexpected result packet"));
    }

    #[test]
    fn test_communication_error_display() {
        let error = communication_error(9, "channel closed");
        let display = format!("{}", error);
        assert!(display.contains("rank 9"));
        assert!(display.contains("channel closed"));
    }

    #[test]
    fn test_error_equality() {
        let error1 = communication_error(3, "test");
        let error2 = communication_error(3, "test");
        let error3 = communication_error(4, "test");

        assert_eq!(error1, error2);
        assert_ne!(error1, error3);
    }

    #[test]
    fn test_bincode_error_becomes_protocol_error() {
        let err: bincode::Error = bincode::deserialize::<Vec<i32>>(&[0xff]).unwrap_err();
        let converted = StrassenError::from(err);
        assert!(matches!(converted, StrassenError::ProtocolError { .. }));
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = validation_error("test error");

        let _: &dyn std::error::Error = &error;
        assert!(std::error::Error::source(&error).is_none());
    }
}
