//! aDOT export.
//!
//! Emits a normalized rendering: declaration blocks in a fixed order,
//! edges in vertex/edge registration order. Importing the output yields an
//! equivalent graph (same vertices, edges, and morph bindings); byte
//! identity with the source text is not a goal.

use std::path::Path;

use fabula_core::{Graph, StrategyKind, Transition};

use crate::error::AdotResult;

/// Serialize a graph to aDOT text.
pub fn emit(graph: &Graph) -> String {
    let mut blocks: Vec<String> = Vec::new();

    push_function_block(
        &mut blocks,
        graph,
        StrategyKind::Selection,
        "selection function declarations",
    );

    let bindings: Vec<String> = graph
        .vertices()
        .filter_map(|vertex| {
            vertex
                .selector_name()
                .map(|name| format!("\t{} [selector={}]", vertex.id(), name))
        })
        .collect();
    if !bindings.is_empty() {
        blocks.push(format!(
            "\t// vertex selector bindings\n{}",
            bindings.join("\n")
        ));
    }

    push_function_block(
        &mut blocks,
        graph,
        StrategyKind::Processor,
        "processor function declarations",
    );
    push_function_block(
        &mut blocks,
        graph,
        StrategyKind::Predicate,
        "predicate function declarations",
    );

    // Transitions in first-encountered order while scanning edges; bundles
    // nothing references are not persisted.
    let mut morphs: Vec<&Transition> = Vec::new();
    for vertex in graph.vertices() {
        for edge in vertex.edges() {
            if let Some(morph) = &edge.morph {
                if !morphs.iter().any(|m| m.name == morph.name) {
                    morphs.push(morph);
                }
            }
        }
    }
    if !morphs.is_empty() {
        let lines: Vec<String> = morphs
            .iter()
            .map(|morph| format!("\t{} [{}]", morph.name, transition_attrs(morph)))
            .collect();
        blocks.push(format!(
            "\t// transition declarations\n{}",
            lines.join("\n")
        ));
    }

    let mut edges: Vec<String> = Vec::new();
    for vertex in graph.vertices() {
        for edge in vertex.edges() {
            let arrow = if edge.threading { "=>" } else { "->" };
            let mut line = format!("\t{} {} {}", vertex.id(), arrow, edge.target);
            if let Some(morph) = &edge.morph {
                line.push_str(&format!(" [morphism={}]", morph.name));
            }
            edges.push(line);
        }
    }
    if !edges.is_empty() {
        blocks.push(format!("\t// graph model\n{}", edges.join("\n")));
    }

    format!("digraph {}\n{{\n{}\n}}\n", graph.id(), blocks.join("\n\n"))
}

/// Serialize a graph and write it to a file.
pub fn emit_to(graph: &Graph, path: impl AsRef<Path>) -> AdotResult<()> {
    std::fs::write(path, emit(graph))?;
    Ok(())
}

fn push_function_block(blocks: &mut Vec<String>, graph: &Graph, kind: StrategyKind, title: &str) {
    let lines: Vec<String> = graph
        .func_descriptions()
        .iter()
        .filter(|desc| desc.kind == kind)
        .map(|desc| {
            format!(
                "\t{} [module={}, entry_func={}]",
                desc.name,
                kind.token(),
                desc.entry
            )
        })
        .collect();
    if !lines.is_empty() {
        blocks.push(format!("\t// {title}\n{}", lines.join("\n")));
    }
}

fn transition_attrs(morph: &Transition) -> String {
    match (&morph.predicate, &morph.processor) {
        (Some(predicate), Some(processor)) => {
            format!("predicate={}, function={}", predicate.name, processor.name)
        }
        (Some(predicate), None) => format!("predicate={}", predicate.name),
        (None, Some(processor)) => format!("function={}", processor.name),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse, ParseOptions};
    use fabula_core::{Registry, VertexId};

    const FIXTURE: &str = r#"digraph 9
{
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

    fn edge_records(graph: &Graph) -> Vec<(VertexId, VertexId, bool, Option<String>)> {
        let mut records: Vec<_> = graph
            .vertices()
            .flat_map(|vertex| {
                vertex.edges().iter().map(move |edge| {
                    (
                        vertex.id(),
                        edge.target,
                        edge.threading,
                        edge.morph.as_ref().map(|m| m.name.clone()),
                    )
                })
            })
            .collect();
        records.sort();
        records
    }

    #[test]
    fn test_round_trip_equivalence() {
        let original = parse(FIXTURE, Registry::standard(), ParseOptions::default()).unwrap();
        let reparsed = parse(
            &emit(&original),
            Registry::standard(),
            ParseOptions::default(),
        )
        .unwrap();

        let mut original_ids = original.vertex_ids().to_vec();
        let mut reparsed_ids = reparsed.vertex_ids().to_vec();
        original_ids.sort();
        reparsed_ids.sort();
        assert_eq!(original_ids, reparsed_ids);

        assert_eq!(edge_records(&original), edge_records(&reparsed));
        assert_eq!(original.id(), reparsed.id());
        assert_eq!(
            original
                .get_vertex(VertexId::Num(1))
                .unwrap()
                .selector_name(),
            reparsed
                .get_vertex(VertexId::Num(1))
                .unwrap()
                .selector_name()
        );
    }

    #[test]
    fn test_emit_is_stable() {
        let graph = parse(FIXTURE, Registry::standard(), ParseOptions::default()).unwrap();
        let first = emit(&graph);
        let second = emit(
            &parse(&first, Registry::standard(), ParseOptions::default()).unwrap(),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_blocks_omitted() {
        let mut graph = Graph::new(2, "plain", Registry::empty());
        graph
            .add_edge(VertexId::Start, VertexId::End, None, false)
            .unwrap();

        let text = emit(&graph);
        assert!(!text.contains("selector"));
        assert!(!text.contains("module="));
        assert!(!text.contains("transition declarations"));
        assert!(text.contains("__BEGIN__ -> __END__"));
    }

    #[test]
    fn test_threading_arrow_preserved() {
        let mut graph = Graph::new(2, "threaded", Registry::empty());
        graph.add_vertex(VertexId::Num(1));
        graph
            .add_edge(VertexId::Start, VertexId::Num(1), None, true)
            .unwrap();
        graph
            .add_edge(VertexId::Num(1), VertexId::End, None, false)
            .unwrap();

        let text = emit(&graph);
        assert!(text.contains("__BEGIN__ => 1"));
        assert!(text.contains("1 -> __END__"));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.adot");

        let graph = parse(FIXTURE, Registry::standard(), ParseOptions::default()).unwrap();
        emit_to(&graph, &path).unwrap();

        let reloaded =
            crate::parse::parse_file(&path, Registry::standard(), ParseOptions::default())
                .unwrap();
        assert_eq!(edge_records(&graph), edge_records(&reloaded));
    }
}
