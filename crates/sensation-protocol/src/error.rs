//! Protocol error types

use std::io;
use thiserror::Error;

/// Protocol error type
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A length prefix announced a frame larger than allowed.
    ///
    /// The byte stream cannot be resynchronised after this, so the
    /// connection has to be dropped.
    #[error("Frame of {size} bytes exceeds maximum {max}")]
    FrameTooLarge {
        /// Announced payload size
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// Message encoding failed
    #[error("Message encoding failed: {0}")]
    EncodingFailed(String),

    /// Message decoding failed
    #[error("Message decoding failed: {0}")]
    DecodingFailed(String),

    /// Region name not part of the schema
    #[error("Unknown region name: {0}")]
    UnknownRegion(String),

    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ProtocolError {
    /// Whether the connection can keep going after this error.
    ///
    /// A single undecodable payload only costs that message.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ProtocolError::DecodingFailed(_) | ProtocolError::UnknownRegion(_)
        )
    }

    /// Create a frame size error
    pub fn frame_too_large(size: usize, max: usize) -> Self {
        ProtocolError::FrameTooLarge { size, max }
    }
}

/// Specialized Result type for protocol operations
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_errors_are_recoverable() {
        assert!(ProtocolError::DecodingFailed("bad varint".to_string()).is_recoverable());
        assert!(!ProtocolError::frame_too_large(20, 10).is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = ProtocolError::frame_too_large(1024, 512);
        assert_eq!(err.to_string(), "Frame of 1024 bytes exceeds maximum 512");

        let err = ProtocolError::UnknownRegion("ELBOW".to_string());
        assert!(err.to_string().contains("ELBOW"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        let err: ProtocolError = io_err.into();
        assert!(matches!(err, ProtocolError::Io(_)));
    }
}
