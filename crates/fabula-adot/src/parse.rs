//! aDOT import.
//!
//! The format is line-oriented; every line inside the `digraph { ... }`
//! block is classified as a function declaration, a transition declaration,
//! a selector binding, or an edge, in that order:
//!
//! ```text
//! digraph 7
//! {
//!     sel1 [module=select_module, entry_func=by_label]
//!     t1 [predicate=pred1, function=proc1]
//!     1 [selector=sel1]
//!     __BEGIN__ -> 1
//!     1 => __END__ [morphism=t1]
//! }
//! ```
//!
//! Import is strict about whole-file structure (sentinel markers, header,
//! at least one edge line) and lenient about individual lines: anything
//! malformed is diagnosed and skipped.

use std::path::Path;

use tracing::{debug, warn};

use fabula_core::{Graph, Registry, StrategyKind, VertexId, END_TOKEN, START_TOKEN};

use crate::error::{AdotError, AdotResult};

/// Options controlling import strictness.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Enforce the whole-file structural checks: sentinel markers present,
    /// header present, at least one edge line.
    pub strict: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// Parse aDOT text into a fresh graph owning the given registry.
pub fn parse(text: &str, registry: Registry, options: ParseOptions) -> AdotResult<Graph> {
    let mut graph = Graph::new(0, "", registry);
    parse_into(&mut graph, text, options)?;
    Ok(graph)
}

/// Read and parse an aDOT file.
pub fn parse_file(
    path: impl AsRef<Path>,
    registry: Registry,
    options: ParseOptions,
) -> AdotResult<Graph> {
    let text = std::fs::read_to_string(path)?;
    parse(&text, registry, options)
}

/// Overlay aDOT text onto an existing graph.
///
/// Hosts use this to layer persisted topology over a graph whose vertices
/// were pre-created from an external store; endpoints named by edge lines
/// are upserted, so existing vertices keep their label and metadata.
pub fn parse_into(graph: &mut Graph, text: &str, options: ParseOptions) -> AdotResult<()> {
    if options.strict && (!text.contains(START_TOKEN) || !text.contains(END_TOKEN)) {
        return Err(AdotError::MissingSentinels);
    }

    if let Some(id) = extract_graph_id(text, options.strict)? {
        graph.set_id(id);
    }

    let mut functions: Vec<&str> = Vec::new();
    let mut transitions: Vec<&str> = Vec::new();
    let mut selectors: Vec<&str> = Vec::new();
    let mut edges: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty()
            || line.starts_with("//")
            || line.starts_with("digraph")
            || line.starts_with('{')
            || line.starts_with('}')
        {
            continue;
        }
        if line.contains("module=") && line.contains("entry_func=") {
            functions.push(line);
        } else if line.contains("predicate=") || line.contains("function=") {
            transitions.push(line);
        } else if line.contains("selector=") {
            selectors.push(line);
        } else if line.contains("->") || line.contains("=>") {
            edges.push(line);
        } else {
            debug!(line = %line, "unclassified line ignored");
        }
    }

    if options.strict && edges.is_empty() {
        return Err(AdotError::NoEdges);
    }

    // Functions first, then transitions, so transitions can resolve them.
    for line in functions {
        apply_function_line(graph, line);
    }
    for line in transitions {
        apply_transition_line(graph, line);
    }
    for line in edges {
        apply_edge_line(graph, line);
    }
    // Selector bindings last: they require the vertices to exist.
    for line in selectors {
        apply_selector_line(graph, line);
    }

    Ok(())
}

/// Find the `digraph <id>` header and parse the id.
///
/// A non-numeric id is a diagnostic, not an error: the id falls back to 0.
fn extract_graph_id(text: &str, strict: bool) -> AdotResult<Option<u64>> {
    let header = text
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("digraph"));
    let Some(header) = header else {
        if strict {
            return Err(AdotError::MissingHeader);
        }
        return Ok(None);
    };

    let token = header.split_whitespace().nth(1).unwrap_or("");
    match token.parse::<u64>() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            warn!(token = %token, "digraph id is not numeric, defaulting to 0");
            Ok(Some(0))
        }
    }
}

/// Extract the value of a `key=value` attribute from a bracket block.
fn attr<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let pattern = format!("{key}=");
    let start = line.find(pattern.as_str())? + pattern.len();
    let rest = &line[start..];
    let end = rest.find([',', ']']).unwrap_or(rest.len());
    let value = rest[..end].trim();
    (!value.is_empty()).then_some(value)
}

fn first_token(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

fn apply_function_line(graph: &mut Graph, line: &str) {
    let name = first_token(line);
    let module = attr(line, "module");
    let entry = attr(line, "entry_func");
    match (name, module.and_then(StrategyKind::from_token), entry) {
        (Some(name), Some(kind), Some(entry)) => graph.add_func_desc(name, kind, entry),
        _ => warn!(line = %line, "malformed function declaration skipped"),
    }
}

fn apply_transition_line(graph: &mut Graph, line: &str) {
    let Some(name) = first_token(line) else {
        warn!(line = %line, "malformed transition declaration skipped");
        return;
    };
    let predicate = attr(line, "predicate");
    let processor = attr(line, "function");
    graph.add_transition(name, processor, predicate);
}

fn apply_edge_line(graph: &mut Graph, line: &str) {
    let mut tokens = line.split_whitespace();
    let (Some(src), Some(arrow), Some(dst)) = (tokens.next(), tokens.next(), tokens.next())
    else {
        warn!(line = %line, "edge line skipped: expected '<src> -> <dst>'");
        return;
    };

    let threading = match arrow {
        "->" => false,
        "=>" => true,
        _ => {
            warn!(line = %line, arrow = %arrow, "edge line skipped: unknown arrow");
            return;
        }
    };

    let (src, dst) = match (src.parse::<VertexId>(), dst.parse::<VertexId>()) {
        (Ok(src), Ok(dst)) => (src, dst),
        (Err(error), _) | (_, Err(error)) => {
            warn!(line = %line, %error, "edge line skipped");
            return;
        }
    };

    graph.add_vertex(src);
    graph.add_vertex(dst);

    let morph = attr(line, "morphism").and_then(|name| match graph.get_transition(name) {
        Some(transition) => Some(transition.clone()),
        None => {
            warn!(morphism = %name, "edge references unknown morphism");
            None
        }
    });

    if let Some(vertex) = graph.get_vertex_mut(src) {
        vertex.add_edge(dst, morph, threading);
    }
}

fn apply_selector_line(graph: &mut Graph, line: &str) {
    let id = first_token(line).and_then(|token| token.parse::<u64>().ok());
    let (Some(id), Some(name)) = (id, attr(line, "selector")) else {
        warn!(line = %line, "selector binding skipped: expected '<numeric-id> [selector=<name>]'");
        return;
    };
    let id = VertexId::Num(id);

    if !graph.contains(id) {
        warn!(%id, "selector binding for unknown vertex skipped");
        return;
    }
    if let Err(error) = graph.set_selector(id, name) {
        warn!(%id, selector = %name, %error, "selector binding skipped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"digraph 9
{
	// strategy declarations
	sel1 [module=select_module, entry_func=by_label]
	pred1 [module=predicate_module, entry_func=carry_step]
	proc1 [module=processor_module, entry_func=read_notes]

	t1 [predicate=pred1, function=proc1]

	1 [selector=sel1]

	__BEGIN__ -> 1
	1 -> 2 [morphism=t1]
	2 => __END__
	1 -> __END__
}
"#;

    #[test]
    fn test_parse_full_fixture() {
        let graph = parse(FIXTURE, Registry::standard(), ParseOptions::default()).unwrap();

        assert_eq!(graph.id(), 9);
        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.func_descriptions().len(), 3);
        assert_eq!(graph.transition_count(), 1);

        let one = graph.get_vertex(VertexId::Num(1)).unwrap();
        assert_eq!(one.selector_name(), Some("sel1"));
        let morphed = one.get_edge(VertexId::Num(2)).unwrap();
        assert_eq!(morphed.morph.as_ref().unwrap().name, "t1");

        let two = graph.get_vertex(VertexId::Num(2)).unwrap();
        assert!(two.get_edge(VertexId::End).unwrap().threading);
    }

    #[test]
    fn test_missing_sentinels_is_fatal() {
        let text = "digraph 1\n{\n\t1 -> 2\n}\n";
        let result = parse(text, Registry::empty(), ParseOptions::default());
        assert!(matches!(result, Err(AdotError::MissingSentinels)));
    }

    #[test]
    fn test_missing_header_is_fatal() {
        let text = "{\n\t__BEGIN__ -> __END__\n}\n";
        let result = parse(text, Registry::empty(), ParseOptions::default());
        assert!(matches!(result, Err(AdotError::MissingHeader)));
    }

    #[test]
    fn test_no_edges_is_fatal() {
        let text = "digraph 1\n{\n\t// __BEGIN__ __END__\n}\n";
        let result = parse(text, Registry::empty(), ParseOptions::default());
        assert!(matches!(result, Err(AdotError::NoEdges)));
    }

    #[test]
    fn test_lenient_mode_skips_whole_file_checks() {
        let text = "\t1 -> 2\n";
        let graph = parse(text, Registry::empty(), ParseOptions { strict: false }).unwrap();
        // Sentinels come from construction; 1 and 2 from the edge line.
        assert_eq!(graph.vertex_count(), 4);
    }

    #[test]
    fn test_bad_edge_token_skipped() {
        let text = "digraph 1\n{\n\t__BEGIN__ -> chapter_one\n\t__BEGIN__ -> __END__\n}\n";
        let graph = parse(text, Registry::empty(), ParseOptions::default()).unwrap();
        assert_eq!(graph.vertex_count(), 2);
        assert!(graph
            .get_vertex(VertexId::Start)
            .unwrap()
            .get_edge(VertexId::End)
            .is_some());
    }

    #[test]
    fn test_unknown_morphism_leaves_edge_bare() {
        let text = "digraph 1\n{\n\t__BEGIN__ -> __END__ [morphism=ghost]\n}\n";
        let graph = parse(text, Registry::empty(), ParseOptions::default()).unwrap();
        let edge = graph
            .get_vertex(VertexId::Start)
            .unwrap()
            .get_edge(VertexId::End)
            .unwrap();
        assert!(edge.morph.is_none());
    }

    #[test]
    fn test_non_numeric_graph_id_defaults() {
        let text = "digraph draft\n{\n\t__BEGIN__ -> __END__\n}\n";
        let graph = parse(text, Registry::empty(), ParseOptions::default()).unwrap();
        assert_eq!(graph.id(), 0);
    }

    #[test]
    fn test_selector_binding_for_unknown_vertex_skipped() {
        let text = "digraph 1\n{\n\tsel1 [module=select_module, entry_func=by_label]\n\t7 [selector=sel1]\n\t__BEGIN__ -> __END__\n}\n";
        let graph = parse(text, Registry::standard(), ParseOptions::default()).unwrap();
        assert_eq!(graph.vertex_count(), 2);
    }

    #[test]
    fn test_parse_into_preserves_existing_vertices() {
        let mut graph = Graph::new(5, "seeded", Registry::empty());
        graph.add_vertex_with(
            VertexId::Num(1),
            Some("prologue".to_string()),
            Default::default(),
        );

        let text = "digraph 5\n{\n\t__BEGIN__ -> 1\n\t1 -> __END__\n}\n";
        parse_into(&mut graph, text, ParseOptions::default()).unwrap();

        // The edge-line upsert must not clobber the pre-created vertex.
        assert_eq!(graph.get_vertex(VertexId::Num(1)).unwrap().label(), "prologue");
        assert_eq!(graph.edge_count(), 2);
    }
}
