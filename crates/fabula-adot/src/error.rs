//! Error types for the aDOT codec.

use thiserror::Error;

/// Result type alias for codec operations.
pub type AdotResult<T> = Result<T, AdotError>;

/// Errors that can occur while importing or exporting aDOT text.
///
/// Only whole-file structural problems are errors; per-line problems are
/// diagnosed and skipped.
#[derive(Debug, Error)]
pub enum AdotError {
    /// The text carries no `__BEGIN__` and/or `__END__` marker.
    #[error("graph text has no __BEGIN__ and/or __END__ marker")]
    MissingSentinels,

    /// The text carries no `digraph` header.
    #[error("graph text has no digraph header")]
    MissingHeader,

    /// The text contains no edge lines at all.
    #[error("graph text contains no edge lines")]
    NoEdges,

    /// I/O error while reading or writing a graph file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
