//! Show command implementation.
//!
//! Prints a structural summary of a graph file, or its host-facing JSON
//! projection with `--json`.

use std::path::Path;

use anyhow::Result;
use petgraph::visit::Dfs;

use fabula_core::{VertexId, START_TOKEN};

/// Execute the show command.
pub fn execute(file: &Path, json: bool) -> Result<()> {
    let graph = super::load_graph(file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&graph.to_model())?);
        return Ok(());
    }

    let label = if graph.label().is_empty() {
        file.display().to_string()
    } else {
        graph.label().to_string()
    };
    println!("📖 Graph {} ({})", graph.id(), label);

    for vertex in graph.vertices() {
        let targets: Vec<String> = vertex
            .edges()
            .iter()
            .map(|edge| {
                let arrow = if edge.threading { "=>" } else { "->" };
                match &edge.morph {
                    Some(morph) => format!("{} {} [{}]", arrow, edge.target, morph.name),
                    None => format!("{} {}", arrow, edge.target),
                }
            })
            .collect();
        let selector = vertex
            .selector_name()
            .map(|name| format!(" (selector: {name})"))
            .unwrap_or_default();
        if targets.is_empty() {
            println!("   {}{}", vertex.label(), selector);
        } else {
            println!("   {}{} {}", vertex.label(), selector, targets.join(", "));
        }
    }

    // Reachability from the start sentinel, via the petgraph projection.
    let (pg, index) = graph.to_petgraph();
    let mut reachable = 0usize;
    if let Some(&start) = index.get(&VertexId::Start) {
        let mut dfs = Dfs::new(&pg, start);
        while dfs.next(&pg).is_some() {
            reachable += 1;
        }
    }

    println!(
        "   Vertices: {} ({} reachable from {})",
        graph.vertex_count(),
        reachable,
        START_TOKEN
    );
    println!("   Edges: {}", graph.edge_count());
    println!("   Transitions: {}", graph.transition_count());

    Ok(())
}
