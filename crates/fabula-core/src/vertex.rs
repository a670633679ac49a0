//! Vertex, edge, and note records.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GraphError, GraphResult};
use crate::id::VertexId;
use crate::strategy::{EdgeView, SelectorState, Transition};

/// Directed connection from one vertex to another.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Target vertex id.
    pub target: VertexId,
    /// Whether the codec renders this edge with the threading arrow (`=>`).
    pub threading: bool,
    /// Transition bundle attached to the edge, if any.
    pub morph: Option<Transition>,
}

/// A named note attached to a vertex, pointing at host-owned content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Note name, unique within its vertex.
    pub name: String,
    /// Path to the note content, interpreted by the host.
    pub path: PathBuf,
}

/// A selection strategy bound to a vertex, together with its private state.
pub struct BoundSelector {
    name: String,
    state: Box<dyn SelectorState>,
}

impl BoundSelector {
    /// Wrap a freshly bound selector state under its description name.
    pub fn new(name: impl Into<String>, state: Box<dyn SelectorState>) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }

    /// Description name the selector was bound from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Advance the selector over the given edge views.
    pub fn next(&mut self, edges: &[EdgeView]) -> Option<VertexId> {
        self.state.next(edges)
    }
}

impl fmt::Debug for BoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundSelector")
            .field("name", &self.name)
            .finish()
    }
}

/// A single vertex of a directed graph.
///
/// Outgoing edges are keyed by target id with upsert semantics: at most one
/// edge per target, registration order preserved.
#[derive(Debug)]
pub struct Vertex {
    id: VertexId,
    label: String,
    metadata: HashMap<String, Value>,
    edges: Vec<Edge>,
    selector: Option<BoundSelector>,
    notes: Vec<Note>,
    was_read: bool,
}

impl Vertex {
    /// Create a vertex whose label defaults to the string form of its id.
    pub fn new(id: VertexId) -> Self {
        Self::with_label(id, None, HashMap::new())
    }

    /// Create a vertex with an explicit label and metadata bag.
    ///
    /// An empty or absent label falls back to the string form of the id.
    pub fn with_label(
        id: VertexId,
        label: Option<String>,
        metadata: HashMap<String, Value>,
    ) -> Self {
        let label = match label {
            Some(label) if !label.is_empty() => label,
            _ => id.to_string(),
        };
        Self {
            id,
            label,
            metadata,
            edges: Vec::new(),
            selector: None,
            notes: Vec::new(),
            was_read: false,
        }
    }

    /// Identifier, immutable after creation.
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Replace the display label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Host-owned metadata bag.
    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    /// Mutable access to the host-owned metadata bag.
    pub fn metadata_mut(&mut self) -> &mut HashMap<String, Value> {
        &mut self.metadata
    }

    /// Outgoing edges in registration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Upsert an edge to `target`, overwriting any prior edge to the same
    /// target in place, then attach the morph.
    pub fn add_edge(&mut self, target: VertexId, morph: Option<Transition>, threading: bool) {
        if let Some(edge) = self.edges.iter_mut().find(|e| e.target == target) {
            edge.threading = threading;
        } else {
            self.edges.push(Edge {
                target,
                threading,
                morph: None,
            });
        }
        // Cannot fail: the edge was just upserted.
        let _ = self.set_morph(target, morph);
    }

    /// The edge to `target`, if present.
    pub fn get_edge(&self, target: VertexId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.target == target)
    }

    /// Remove and return the edge to `target`.
    pub fn del_edge(&mut self, target: VertexId) -> Option<Edge> {
        let index = self.edges.iter().position(|e| e.target == target)?;
        Some(self.edges.remove(index))
    }

    /// Attach a morph to the existing edge to `target`.
    ///
    /// Empty transitions are dropped; a missing edge is a typed error.
    pub fn set_morph(&mut self, target: VertexId, morph: Option<Transition>) -> GraphResult<()> {
        let id = self.id;
        let edge = self
            .edges
            .iter_mut()
            .find(|e| e.target == target)
            .ok_or(GraphError::EdgeNotFound {
                from: id,
                to: target,
            })?;
        edge.morph = morph.filter(|m| !m.is_empty());
        Ok(())
    }

    /// The bound selector, if any.
    pub fn selector(&self) -> Option<&BoundSelector> {
        self.selector.as_ref()
    }

    /// Mutable access to the bound selector (needed to advance its state).
    pub fn selector_mut(&mut self) -> Option<&mut BoundSelector> {
        self.selector.as_mut()
    }

    /// Name of the bound selector, if any.
    pub fn selector_name(&self) -> Option<&str> {
        self.selector.as_ref().map(|s| s.name())
    }

    /// Bind a selector, replacing any previous binding (and its memory).
    pub fn bind_selector(&mut self, selector: BoundSelector) {
        self.selector = Some(selector);
    }

    /// Whether the vertex content has been read during a walk.
    pub fn readstate(&self) -> bool {
        self.was_read
    }

    /// Set the read mark.
    pub fn set_readstate(&mut self, read: bool) {
        self.was_read = read;
    }

    /// Notes in registration order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Upsert a note by name.
    pub fn add_note(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        let name = name.into();
        let path = path.into();
        if let Some(note) = self.notes.iter_mut().find(|n| n.name == name) {
            note.path = path;
        } else {
            self.notes.push(Note { name, path });
        }
    }

    /// Remove and return the note with the given name.
    pub fn del_note(&mut self, name: &str) -> Option<Note> {
        let index = self.notes.iter().position(|n| n.name == name)?;
        Some(self.notes.remove(index))
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
