//! Strategy abstractions for graph traversal.
//!
//! Three kinds of strategies drive a walk: a **selection** strategy picks the
//! next outgoing edge of a vertex, a **predicate** decides whether the step
//! carries an effect, and a **processor** applies that effect. Strategies are
//! registered once in a [`Registry`] at graph construction and referenced by
//! name from the aDOT text.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::id::VertexId;
use crate::vertex::Vertex;

/// The three strategy tables a registry carries.
///
/// The original free-string module names become a closed set; `token`
/// preserves the wire rendering used by the aDOT `module=` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Next-edge selection strategies bound to vertices.
    Selection,
    /// Step predicates attached to transitions.
    Predicate,
    /// Step processors attached to transitions.
    Processor,
}

impl StrategyKind {
    /// Wire token used by the aDOT `module=` attribute.
    pub fn token(&self) -> &'static str {
        match self {
            StrategyKind::Selection => "select_module",
            StrategyKind::Predicate => "predicate_module",
            StrategyKind::Processor => "processor_module",
        }
    }

    /// Parse the aDOT `module=` attribute value.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "select_module" => Some(StrategyKind::Selection),
            "predicate_module" => Some(StrategyKind::Predicate),
            "processor_module" => Some(StrategyKind::Processor),
            _ => None,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Snapshot of an outgoing edge handed to a bound selector.
///
/// Resolving `{target, label}` pairs up front keeps selector state
/// unit-testable without any binding machinery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeView {
    /// Target vertex id.
    pub target: VertexId,
    /// Target vertex label at call time.
    pub label: String,
}

/// Stateful next-target chooser bound to a single vertex.
///
/// Visited memory is private per bound instance and reset only by
/// re-binding.
pub trait SelectorState: Send + Sync {
    /// Pick the next target among the vertex's current outgoing edges.
    ///
    /// Returns `None` only when the vertex has no outgoing edges.
    fn next(&mut self, edges: &[EdgeView]) -> Option<VertexId>;
}

/// Factory that binds a selection strategy to a vertex.
pub trait SelectorFactory: Send + Sync {
    /// Produce a fresh stateful selector for the given vertex.
    fn bind(&self, vertex: &Vertex) -> Box<dyn SelectorState>;
}

/// Argument value a predicate passes on to the processor of the same morph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepArgs {
    /// Vertex the walk is about to enter.
    pub target: VertexId,
    /// Vertex the walk is leaving.
    pub source: VertexId,
}

/// Decides whether a step carries an effect, and with which arguments.
pub trait Predicate: Send + Sync {
    /// Evaluate the step `from -> to`; `Ok(None)` suppresses the processor.
    fn evaluate(
        &self,
        graph: &Graph,
        from: VertexId,
        to: VertexId,
    ) -> GraphResult<Option<StepArgs>>;
}

/// Applies the effect of a step using the predicate's arguments.
pub trait Processor: Send + Sync {
    /// Apply the step effect; may mutate vertex state (read marks, notes).
    fn process(&self, graph: &mut Graph, args: &StepArgs) -> GraphResult<()>;
}

/// Named handle on a predicate resolved out of a registry table.
#[derive(Clone)]
pub struct NamedPredicate {
    /// Function-description name the handle was resolved from.
    pub name: String,
    /// The resolved strategy.
    pub strategy: Arc<dyn Predicate>,
}

/// Named handle on a processor resolved out of a registry table.
#[derive(Clone)]
pub struct NamedProcessor {
    /// Function-description name the handle was resolved from.
    pub name: String,
    /// The resolved strategy.
    pub strategy: Arc<dyn Processor>,
}

/// A named bundle of an optional predicate and an optional processor,
/// attachable to edges ("morphism").
#[derive(Clone)]
pub struct Transition {
    /// Transition name, unique within its graph.
    pub name: String,
    /// Predicate slot.
    pub predicate: Option<NamedPredicate>,
    /// Processor slot.
    pub processor: Option<NamedProcessor>,
}

impl Transition {
    /// Whether neither slot resolved. Empty transitions are never stored.
    pub fn is_empty(&self) -> bool {
        self.predicate.is_none() && self.processor.is_none()
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("predicate", &self.predicate.as_ref().map(|p| &p.name))
            .field("processor", &self.processor.as_ref().map(|p| &p.name))
            .finish()
    }
}

impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.predicate.as_ref().map(|p| &p.name) == other.predicate.as_ref().map(|p| &p.name)
            && self.processor.as_ref().map(|p| &p.name) == other.processor.as_ref().map(|p| &p.name)
    }
}

/// Immutable name→strategy tables supplied once at graph construction.
///
/// Built through [`RegistryBuilder`]; no mutation is possible afterwards, so
/// every graph instance sees a fixed strategy set for its whole life.
#[derive(Default)]
pub struct Registry {
    selectors: HashMap<String, Arc<dyn SelectorFactory>>,
    predicates: HashMap<String, Arc<dyn Predicate>>,
    processors: HashMap<String, Arc<dyn Processor>>,
}

impl Registry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// A registry with no strategies at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The builtin strategy set: `by_label` selection, `carry_step`
    /// predicate, `read_notes` processor.
    pub fn standard() -> Self {
        Self::builder()
            .selector("by_label", Arc::new(ByLabelSelector))
            .predicate("carry_step", Arc::new(CarryStepPredicate))
            .processor("read_notes", Arc::new(ReadNotesProcessor))
            .build()
    }

    /// Look up a selection strategy factory.
    pub fn selector(&self, entry: &str) -> Option<&Arc<dyn SelectorFactory>> {
        self.selectors.get(entry)
    }

    /// Look up a predicate strategy.
    pub fn predicate(&self, entry: &str) -> Option<&Arc<dyn Predicate>> {
        self.predicates.get(entry)
    }

    /// Look up a processor strategy.
    pub fn processor(&self, entry: &str) -> Option<&Arc<dyn Processor>> {
        self.processors.get(entry)
    }

    /// Number of strategies registered under the given kind.
    pub fn count(&self, kind: StrategyKind) -> usize {
        match kind {
            StrategyKind::Selection => self.selectors.len(),
            StrategyKind::Predicate => self.predicates.len(),
            StrategyKind::Processor => self.processors.len(),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("selectors", &self.selectors.keys().collect::<Vec<_>>())
            .field("predicates", &self.predicates.keys().collect::<Vec<_>>())
            .field("processors", &self.processors.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Consuming builder for [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    selectors: HashMap<String, Arc<dyn SelectorFactory>>,
    predicates: HashMap<String, Arc<dyn Predicate>>,
    processors: HashMap<String, Arc<dyn Processor>>,
}

impl RegistryBuilder {
    /// Register a selection strategy factory.
    pub fn selector(mut self, entry: impl Into<String>, factory: Arc<dyn SelectorFactory>) -> Self {
        self.selectors.insert(entry.into(), factory);
        self
    }

    /// Register a predicate strategy.
    pub fn predicate(mut self, entry: impl Into<String>, strategy: Arc<dyn Predicate>) -> Self {
        self.predicates.insert(entry.into(), strategy);
        self
    }

    /// Register a processor strategy.
    pub fn processor(mut self, entry: impl Into<String>, strategy: Arc<dyn Processor>) -> Self {
        self.processors.insert(entry.into(), strategy);
        self
    }

    /// Finish building; the resulting registry is immutable.
    pub fn build(self) -> Registry {
        Registry {
            selectors: self.selectors,
            predicates: self.predicates,
            processors: self.processors,
        }
    }
}

/// Label-ordered round-robin selection strategy.
///
/// Chooses targets in ascending lexicographic order of their label, each
/// exactly once; after the last unvisited target has been handed out, every
/// later call returns the first target ever chosen.
#[derive(Debug, Default, Clone)]
pub struct ByLabelSelector;

impl SelectorFactory for ByLabelSelector {
    fn bind(&self, _vertex: &Vertex) -> Box<dyn SelectorState> {
        Box::new(ByLabelState {
            visited: Vec::new(),
        })
    }
}

#[derive(Debug, Default)]
struct ByLabelState {
    // First-chosen order; index 0 is the wrap-around target.
    visited: Vec<VertexId>,
}

impl SelectorState for ByLabelState {
    fn next(&mut self, edges: &[EdgeView]) -> Option<VertexId> {
        let mut ordered: Vec<&EdgeView> = edges.iter().collect();
        ordered.sort_by(|a, b| a.label.cmp(&b.label));

        for view in ordered {
            if !self.visited.contains(&view.target) {
                self.visited.push(view.target);
                return Some(view.target);
            }
        }

        self.visited.first().copied()
    }
}

/// Predicate that verifies both endpoints and carries them to the processor.
#[derive(Debug, Default, Clone)]
pub struct CarryStepPredicate;

impl Predicate for CarryStepPredicate {
    fn evaluate(
        &self,
        graph: &Graph,
        from: VertexId,
        to: VertexId,
    ) -> GraphResult<Option<StepArgs>> {
        if graph.get_vertex(from).is_none() || graph.get_vertex(to).is_none() {
            return Ok(None);
        }
        Ok(Some(StepArgs {
            target: to,
            source: from,
        }))
    }
}

/// Processor that marks the entered vertex read and surfaces its notes.
#[derive(Debug, Default, Clone)]
pub struct ReadNotesProcessor;

impl Processor for ReadNotesProcessor {
    fn process(&self, graph: &mut Graph, args: &StepArgs) -> GraphResult<()> {
        let source_label = graph
            .get_vertex(args.source)
            .map(|v| v.label().to_string())
            .unwrap_or_else(|| args.source.to_string());

        let vertex = graph
            .get_vertex_mut(args.target)
            .ok_or(GraphError::VertexNotFound { id: args.target })?;

        if !vertex.readstate() {
            vertex.set_readstate(true);
            for note in vertex.notes() {
                info!(note = %note.name, path = %note.path.display(), "reading note");
            }
        }

        info!(from = %source_label, to = %vertex.label(), "step");
        Ok(())
    }
}
