//! The graph aggregate: vertices, function descriptions, transitions.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{GraphError, GraphResult};
use crate::id::VertexId;
use crate::strategy::{
    EdgeView, NamedPredicate, NamedProcessor, Registry, StrategyKind, Transition,
};
use crate::vertex::{BoundSelector, Edge, Vertex};

/// Symbolic description of a strategy entry, registered for later resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDesc {
    /// Description name, referenced by transitions and selector bindings.
    pub name: String,
    /// Which registry table the entry lives in.
    pub kind: StrategyKind,
    /// Entry name inside that table.
    pub entry: String,
}

/// A directed graph of named vertices framed by the two sentinels.
///
/// Owns every vertex (keyed by identifier, insertion order preserved), the
/// function-description table, the transition table, and the immutable
/// strategy registry supplied at construction.
#[derive(Debug)]
pub struct Graph {
    id: u64,
    label: String,
    vertices: HashMap<VertexId, Vertex>,
    order: Vec<VertexId>,
    func_descriptions: Vec<FuncDesc>,
    transitions: HashMap<String, Transition>,
    registry: Registry,
}

impl Graph {
    /// Create an empty graph seeded with the Start and End sentinels.
    pub fn new(id: u64, label: impl Into<String>, registry: Registry) -> Self {
        let mut graph = Self {
            id,
            label: label.into(),
            vertices: HashMap::new(),
            order: Vec::new(),
            func_descriptions: Vec::new(),
            transitions: HashMap::new(),
            registry,
        };
        graph.add_vertex(VertexId::Start);
        graph.add_vertex(VertexId::End);
        graph
    }

    /// Graph id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Replace the graph id (the codec adopts the id of imported text).
    pub fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    /// Graph label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Replace the graph label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// The strategy registry, fixed for the life of this graph.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Vertices
    // ------------------------------------------------------------------

    /// Upsert a vertex with a defaulted label.
    ///
    /// If a vertex with that id already exists it is returned unchanged.
    pub fn add_vertex(&mut self, id: VertexId) -> &mut Vertex {
        self.add_vertex_with(id, None, HashMap::new())
    }

    /// Upsert a vertex with an explicit label and metadata bag.
    ///
    /// If a vertex with that id already exists it is returned unchanged —
    /// the new label and metadata are discarded.
    pub fn add_vertex_with(
        &mut self,
        id: VertexId,
        label: Option<String>,
        metadata: HashMap<String, Value>,
    ) -> &mut Vertex {
        match self.vertices.entry(id) {
            Entry::Occupied(entry) => {
                debug!(%id, "vertex already exists, keeping existing");
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                self.order.push(id);
                entry.insert(Vertex::with_label(id, label, metadata))
            }
        }
    }

    /// Bulk upsert of plain vertices.
    pub fn add_vertices(&mut self, ids: impl IntoIterator<Item = VertexId>) {
        for id in ids {
            self.add_vertex(id);
        }
    }

    /// Remove a vertex and every edge in every remaining vertex targeting it.
    ///
    /// Sentinels cannot be removed.
    pub fn del_vertex(&mut self, id: VertexId) -> GraphResult<Vertex> {
        if id.is_sentinel() {
            return Err(GraphError::SentinelImmutable { id });
        }
        let removed = self
            .vertices
            .remove(&id)
            .ok_or(GraphError::VertexNotFound { id })?;
        self.order.retain(|v| *v != id);
        for vertex in self.vertices.values_mut() {
            vertex.del_edge(id);
        }
        Ok(removed)
    }

    /// Look up a vertex.
    pub fn get_vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Look up a vertex mutably.
    pub fn get_vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(&id)
    }

    /// Whether a vertex with the given id exists.
    pub fn contains(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    /// Vertex ids in insertion order.
    pub fn vertex_ids(&self) -> &[VertexId] {
        &self.order
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.order.iter().filter_map(|id| self.vertices.get(id))
    }

    /// Number of vertices, sentinels included.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Total number of edges across all vertices.
    pub fn edge_count(&self) -> usize {
        self.vertices.values().map(|v| v.edges().len()).sum()
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Upsert an edge between two existing vertices, resolving the morph
    /// name against the transition table.
    pub fn add_edge(
        &mut self,
        from: VertexId,
        to: VertexId,
        morph: Option<&str>,
        threading: bool,
    ) -> GraphResult<()> {
        if !self.contains(to) {
            return Err(GraphError::VertexNotFound { id: to });
        }
        let morph = match morph {
            Some(name) => Some(self.transitions.get(name).cloned().ok_or_else(|| {
                GraphError::UnknownTransition {
                    name: name.to_string(),
                }
            })?),
            None => None,
        };
        let vertex = self
            .vertices
            .get_mut(&from)
            .ok_or(GraphError::VertexNotFound { id: from })?;
        vertex.add_edge(to, morph, threading);
        Ok(())
    }

    /// Remove and return the edge between two vertices.
    pub fn del_edge(&mut self, from: VertexId, to: VertexId) -> GraphResult<Edge> {
        let vertex = self
            .vertices
            .get_mut(&from)
            .ok_or(GraphError::VertexNotFound { id: from })?;
        vertex
            .del_edge(to)
            .ok_or(GraphError::EdgeNotFound { from, to })
    }

    /// Resolve `{target, label}` views of a vertex's outgoing edges.
    pub fn edge_views(&self, id: VertexId) -> GraphResult<Vec<EdgeView>> {
        let vertex = self
            .get_vertex(id)
            .ok_or(GraphError::VertexNotFound { id })?;
        Ok(vertex
            .edges()
            .iter()
            .map(|edge| EdgeView {
                target: edge.target,
                label: self
                    .get_vertex(edge.target)
                    .map(|v| v.label().to_string())
                    .unwrap_or_else(|| edge.target.to_string()),
            })
            .collect())
    }

    // ------------------------------------------------------------------
    // Function descriptions and transitions
    // ------------------------------------------------------------------

    /// Register a symbolic name for a registry entry.
    pub fn add_func_desc(
        &mut self,
        name: impl Into<String>,
        kind: StrategyKind,
        entry: impl Into<String>,
    ) {
        let name = name.into();
        let entry = entry.into();
        if let Some(desc) = self.func_descriptions.iter_mut().find(|d| d.name == name) {
            desc.kind = kind;
            desc.entry = entry;
        } else {
            self.func_descriptions.push(FuncDesc { name, kind, entry });
        }
    }

    /// Registered function descriptions, in registration order.
    pub fn func_descriptions(&self) -> &[FuncDesc] {
        &self.func_descriptions
    }

    fn find_desc(&self, name: &str) -> Option<&FuncDesc> {
        self.func_descriptions.iter().find(|d| d.name == name)
    }

    /// Register a transition, resolving each descriptor against the registry.
    ///
    /// A slot that fails to resolve is left empty with a diagnostic; if
    /// neither slot resolves the transition is dropped entirely and `None`
    /// is returned. That silent-drop policy is load-bearing: imported text
    /// may reference strategies the host never registered.
    pub fn add_transition(
        &mut self,
        name: &str,
        processor: Option<&str>,
        predicate: Option<&str>,
    ) -> Option<&Transition> {
        let mut transition = Transition {
            name: name.to_string(),
            predicate: None,
            processor: None,
        };

        if let Some(desc_name) = predicate {
            match self.resolve_predicate(desc_name) {
                Ok(resolved) => transition.predicate = Some(resolved),
                Err(error) => warn!(transition = name, %error, "predicate did not resolve"),
            }
        }
        if let Some(desc_name) = processor {
            match self.resolve_processor(desc_name) {
                Ok(resolved) => transition.processor = Some(resolved),
                Err(error) => warn!(transition = name, %error, "processor did not resolve"),
            }
        }

        if transition.is_empty() {
            warn!(transition = name, "no corresponding functions found, dropping transition");
            return None;
        }
        self.transitions.insert(name.to_string(), transition);
        self.transitions.get(name)
    }

    fn resolve_predicate(&self, desc_name: &str) -> GraphResult<NamedPredicate> {
        let desc = self
            .find_desc(desc_name)
            .ok_or_else(|| GraphError::UnknownFunctionDescription {
                name: desc_name.to_string(),
            })?;
        let strategy = self
            .registry
            .predicate(&desc.entry)
            .cloned()
            .ok_or_else(|| GraphError::UnknownFunction {
                kind: StrategyKind::Predicate,
                entry: desc.entry.clone(),
            })?;
        Ok(NamedPredicate {
            name: desc_name.to_string(),
            strategy,
        })
    }

    fn resolve_processor(&self, desc_name: &str) -> GraphResult<NamedProcessor> {
        let desc = self
            .find_desc(desc_name)
            .ok_or_else(|| GraphError::UnknownFunctionDescription {
                name: desc_name.to_string(),
            })?;
        let strategy = self
            .registry
            .processor(&desc.entry)
            .cloned()
            .ok_or_else(|| GraphError::UnknownFunction {
                kind: StrategyKind::Processor,
                entry: desc.entry.clone(),
            })?;
        Ok(NamedProcessor {
            name: desc_name.to_string(),
            strategy,
        })
    }

    /// Look up a transition by name.
    pub fn get_transition(&self, name: &str) -> Option<&Transition> {
        self.transitions.get(name)
    }

    /// Number of stored transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    // ------------------------------------------------------------------
    // Selectors
    // ------------------------------------------------------------------

    /// Bind a selection strategy to a vertex by description name.
    ///
    /// The factory is invoked with the vertex itself; re-binding resets the
    /// selector's visited memory.
    pub fn set_selector(&mut self, id: VertexId, desc_name: &str) -> GraphResult<()> {
        let entry = self
            .find_desc(desc_name)
            .ok_or_else(|| GraphError::UnknownSelector {
                name: desc_name.to_string(),
            })?
            .entry
            .clone();
        let factory =
            self.registry
                .selector(&entry)
                .cloned()
                .ok_or_else(|| GraphError::UnknownSelector {
                    name: desc_name.to_string(),
                })?;
        let vertex = self
            .vertices
            .get_mut(&id)
            .ok_or(GraphError::VertexNotFound { id })?;
        let state = factory.bind(vertex);
        vertex.bind_selector(BoundSelector::new(desc_name, state));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Analysis projection
    // ------------------------------------------------------------------

    /// Convert to a petgraph `StableDiGraph` for analysis or visualization.
    ///
    /// Node weights are vertex ids, edge weights the morph name (if any);
    /// the returned map translates ids back to node indices.
    pub fn to_petgraph(&self) -> (StableDiGraph<VertexId, Option<String>>, HashMap<VertexId, NodeIndex>) {
        let mut graph = StableDiGraph::new();
        let mut id_to_index = HashMap::new();

        for id in &self.order {
            let index = graph.add_node(*id);
            id_to_index.insert(*id, index);
        }

        for vertex in self.vertices() {
            for edge in vertex.edges() {
                if let (Some(&from), Some(&to)) = (
                    id_to_index.get(&vertex.id()),
                    id_to_index.get(&edge.target),
                ) {
                    graph.add_edge(from, to, edge.morph.as_ref().map(|m| m.name.clone()));
                }
            }
        }

        (graph, id_to_index)
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
