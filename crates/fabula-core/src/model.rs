//! Structural projection exchanged with the host.
//!
//! The host bulk-loads graphs from, and projects graphs to, an external
//! store through these DTOs. The core owns only topology and transition
//! bindings; labels, metadata, and timestamps are host-owned payload that
//! passes through untouched.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::id::VertexId;
use crate::strategy::Registry;

/// Edge record inside the projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeModel {
    /// Whether the edge uses the threading rendering.
    #[serde(default)]
    pub threading: bool,
    /// Name of the transition bound to the edge, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morph: Option<String>,
}

/// Vertex record inside the projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeModel {
    /// Vertex id.
    pub id: VertexId,
    /// Display label; empty means "default to the id".
    #[serde(default)]
    pub label: String,
    /// Host-owned metadata bag.
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    /// Outgoing edges keyed by target id.
    #[serde(default)]
    pub edges: BTreeMap<VertexId, EdgeModel>,
}

/// Whole-graph projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphModel {
    /// Graph id.
    pub id: u64,
    /// Graph label.
    #[serde(default)]
    pub label: String,
    /// Vertices keyed by id.
    #[serde(default)]
    pub vertices: BTreeMap<VertexId, NodeModel>,
}

impl Graph {
    /// Build a graph from the host's structural projection.
    ///
    /// Vertices are created first; edges are then resolved against the
    /// already-built vertex set, so a forward reference within the model is
    /// fine but an edge naming an id absent from the model is a fatal input
    /// error. Morph names are resolved against the (typically empty)
    /// transition table; unresolvable names leave the edge morph-free.
    pub fn from_model(id: u64, model: &GraphModel, registry: Registry) -> GraphResult<Graph> {
        let mut graph = Graph::new(id, model.label.clone(), registry);

        for node in model.vertices.values() {
            let label = (!node.label.is_empty()).then(|| node.label.clone());
            graph.add_vertex_with(node.id, label, node.metadata.clone());
        }

        for node in model.vertices.values() {
            for (target, edge) in &node.edges {
                if !graph.contains(*target) {
                    return Err(GraphError::VertexNotFound { id: *target });
                }
                let morph = match &edge.morph {
                    Some(name) => match graph.get_transition(name) {
                        Some(transition) => Some(transition.clone()),
                        None => {
                            warn!(morph = %name, "projection edge references unknown transition");
                            None
                        }
                    },
                    None => None,
                };
                if let Some(vertex) = graph.get_vertex_mut(node.id) {
                    vertex.add_edge(*target, morph, edge.threading);
                }
            }
        }

        Ok(graph)
    }

    /// Project this graph into the host-facing structural form.
    pub fn to_model(&self) -> GraphModel {
        let mut vertices = BTreeMap::new();
        for vertex in self.vertices() {
            let mut edges = BTreeMap::new();
            for edge in vertex.edges() {
                edges.insert(
                    edge.target,
                    EdgeModel {
                        threading: edge.threading,
                        morph: edge.morph.as_ref().map(|m| m.name.clone()),
                    },
                );
            }
            vertices.insert(
                vertex.id(),
                NodeModel {
                    id: vertex.id(),
                    label: vertex.label().to_string(),
                    metadata: vertex.metadata().clone(),
                    edges,
                },
            );
        }
        GraphModel {
            id: self.id(),
            label: self.label().to_string(),
            vertices,
        }
    }
}
