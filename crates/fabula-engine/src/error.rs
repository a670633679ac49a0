//! Error types for traversal and linearization.

use thiserror::Error;

use fabula_core::{GraphError, VertexId};

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while walking or linearizing a graph.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A vertex referenced during the walk is not part of the graph.
    #[error("vertex not found: {id}")]
    VertexNotFound { id: VertexId },

    /// A non-end vertex has no outgoing edge to follow.
    #[error("vertex {id} has no outgoing edge to follow")]
    DeadEnd { id: VertexId },

    /// The walk did not reach the end sentinel within the step bound.
    #[error("walk exceeded {max_steps} steps without reaching the end sentinel")]
    StepLimitExceeded { max_steps: usize },

    /// A strategy reported a graph-level failure.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
