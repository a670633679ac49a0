//! Core domain model for the fabula branching-story graph engine.
//!
//! A fabula graph is a directed graph of named vertices framed by two
//! sentinel vertices, `__BEGIN__` and `__END__`, that exist exactly once in
//! every graph. Edges may carry a named **transition** (a predicate plus a
//! processor strategy), and vertices may carry a bound **selector** that
//! picks the next edge during traversal. All strategies live in an
//! immutable [`Registry`] supplied at graph construction and are referenced
//! by name from the persisted text form.
//!
//! ## Core Concepts
//!
//! - **VertexId**: tagged identifier — numeric or one of the two sentinels
//! - **Vertex**: a node with label, metadata, ordered edges, notes, and an
//!   optional bound selector
//! - **Transition**: a named `(predicate?, processor?)` bundle attachable to
//!   edges ("morphism")
//! - **Registry**: three fixed name→strategy tables (selection, predicate,
//!   processor)
//! - **GraphModel**: the structural projection exchanged with the host
//!
//! Parsing and serialization of the aDOT text form live in `fabula-adot`;
//! traversal and chapter ordering live in `fabula-engine`.

mod error;
mod graph;
mod id;
mod model;
mod strategy;
mod vertex;

pub use error::{GraphError, GraphResult};
pub use graph::{FuncDesc, Graph};
pub use id::{VertexId, END_TOKEN, START_TOKEN};
pub use model::{EdgeModel, GraphModel, NodeModel};
pub use strategy::{
    ByLabelSelector, CarryStepPredicate, EdgeView, NamedPredicate, NamedProcessor, Predicate,
    Processor, ReadNotesProcessor, Registry, RegistryBuilder, SelectorFactory, SelectorState,
    StepArgs, StrategyKind, Transition,
};
pub use vertex::{BoundSelector, Edge, Note, Vertex};
