//! Pipeline error types

use thiserror::Error;

/// Pipeline error type
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage could not process an item
    #[error("Stage '{stage}' failed: {reason}")]
    StageFailed {
        /// Stage name
        stage: String,
        /// What went wrong
        reason: String,
    },

    /// A stage could not be activated
    #[error("Set-up of stage '{stage}' failed: {reason}")]
    SetUpFailed {
        /// Stage name
        stage: String,
        /// What went wrong
        reason: String,
    },

    /// In-flight work did not finish within the tear-down grace period
    #[error("Tear-down of stage '{stage}' timed out with {pending} unit(s) still running")]
    TearDownTimeout {
        /// Stage name
        stage: String,
        /// Units that had not terminated
        pending: usize,
    },

    /// An inlet was used before being connected, or after the graph was dropped
    #[error("Pipeline inlet is not connected")]
    InletUnavailable,
}

impl PipelineError {
    /// Create a stage failure
    pub fn stage_failed(stage: impl Into<String>, reason: impl ToString) -> Self {
        PipelineError::StageFailed {
            stage: stage.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a set-up failure
    pub fn set_up_failed(stage: impl Into<String>, reason: impl ToString) -> Self {
        PipelineError::SetUpFailed {
            stage: stage.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if processing can continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::StageFailed { .. } | PipelineError::TearDownTimeout { .. }
        )
    }
}

/// Specialized Result type for pipeline operations
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
