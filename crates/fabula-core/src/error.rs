//! Error types for the graph domain model.

use thiserror::Error;

use crate::id::VertexId;
use crate::strategy::StrategyKind;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur while building or mutating a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A vertex referenced by id is not part of the graph.
    #[error("vertex not found: {id}")]
    VertexNotFound { id: VertexId },

    /// An edge between the two vertices does not exist.
    #[error("edge not found: {from} -> {to}")]
    EdgeNotFound { from: VertexId, to: VertexId },

    /// Sentinel vertices exist exactly once per graph and cannot be removed.
    #[error("sentinel vertex {id} cannot be removed")]
    SentinelImmutable { id: VertexId },

    /// A token is neither numeric nor one of the sentinel tokens.
    #[error("invalid identifier token: {token:?}")]
    InvalidIdentifier { token: String },

    /// A function description names an entry the registry does not carry.
    #[error("no {kind} strategy registered under entry {entry:?}")]
    UnknownFunction { kind: StrategyKind, entry: String },

    /// A symbolic function description was never registered.
    #[error("function description not found: {name:?}")]
    UnknownFunctionDescription { name: String },

    /// A transition referenced by name is absent from the transition table.
    #[error("transition not found: {name:?}")]
    UnknownTransition { name: String },

    /// A selector description does not resolve to a selection strategy.
    #[error("selector {name:?} does not resolve to a selection strategy")]
    UnknownSelector { name: String },

    /// Metadata or projection serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
