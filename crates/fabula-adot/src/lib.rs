//! aDOT text codec for fabula graphs.
//!
//! aDOT is the line-oriented persistence format for a graph together with
//! its strategy bindings: function declarations, transition declarations,
//! selector bindings, and edges, wrapped in a `digraph <id> { ... }` block.
//! One blob persists one graph; the host decides where it lives.
//!
//! Import is strict about whole-file structure and lenient per line (bad
//! lines are diagnosed via `tracing` and skipped); export produces a
//! normalized block order that re-imports to an equivalent graph.

mod emit;
mod error;
mod parse;

pub use emit::{emit, emit_to};
pub use error::{AdotError, AdotResult};
pub use parse::{parse, parse_file, parse_into, ParseOptions};
