//! Error types for queue operations.

use thiserror::Error;

/// Errors produced while enqueueing or executing signaling tasks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The resource exposes no operation with this name.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    /// The resource reported a failure while running the operation.
    #[error("operation `{operation}` failed: {message}")]
    Execution {
        /// Operation that failed.
        operation: String,
        /// Failure reported by the resource.
        message: String,
    },
    /// A payload could not be turned into a domain object.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    /// No operation with this name is registered on the queue.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
    /// Queue construction or configuration failed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl QueueError {
    /// Shorthand for an execution failure of `operation`.
    pub fn execution(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
