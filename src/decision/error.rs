use thiserror::Error;

/// Failures a decision node or resource callback can report.
///
/// The traversal loop turns each variant into a status code; none of them
/// escapes [`Engine::run`](crate::decision::Engine::run).
#[derive(Debug, Error)]
pub enum FlowError {
    /// The client sent something unusable. Becomes a 400 whose body carries
    /// the message.
    #[error("{0}")]
    MalformedRequest(String),

    /// Stop traversal and answer with this status code.
    #[error("halted with status {0}")]
    Halt(u16),

    /// The resource or the engine broke its own contract.
    #[error("invalid resource: {0}")]
    InvalidResource(String),

    /// Any other failure inside a resource callback.
    #[error(transparent)]
    Resource(#[from] anyhow::Error),
}

impl FlowError {
    pub fn malformed(message: impl Into<String>) -> Self {
        FlowError::MalformedRequest(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        FlowError::InvalidResource(message.into())
    }
}

/// Result type for decision nodes and resource callbacks.
pub type Outcome<T> = Result<T, FlowError>;
