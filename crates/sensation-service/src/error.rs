//! Service error types

use std::io;

use sensation_actors::ActorError;
use sensation_pipeline::PipelineError;
use sensation_protocol::ProtocolError;
use thiserror::Error;

/// Service error type
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Configuration could not be read or is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Listening socket could not be opened
    #[error("Failed to bind {address}: {source}")]
    Bind {
        /// Address requested
        address: String,
        /// Underlying failure
        source: io::Error,
    },

    /// A pattern was rejected on load
    #[error("Invalid pattern '{identifier}': {reason}")]
    InvalidPattern {
        /// Pattern identifier
        identifier: String,
        /// Why it was rejected
        reason: String,
    },

    /// `start` was called on a server that is not stopped
    #[error("Server is already running")]
    AlreadyRunning,

    /// Wire protocol error
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Actor error
    #[error(transparent)]
    Actor(#[from] ActorError),

    /// Pipeline error
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ServiceError {
    /// Create an invalid pattern error
    pub fn invalid_pattern(identifier: impl Into<String>, reason: impl ToString) -> Self {
        ServiceError::InvalidPattern {
            identifier: identifier.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if the service can keep running after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            ServiceError::InvalidPattern { .. } => true,
            ServiceError::Protocol(e) => e.is_recoverable(),
            ServiceError::Actor(e) => e.is_recoverable(),
            ServiceError::Pipeline(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

impl From<serde_yaml::Error> for ServiceError {
    fn from(e: serde_yaml::Error) -> Self {
        ServiceError::InvalidConfig(e.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::InvalidConfig(e.to_string())
    }
}

/// Specialized Result type for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
