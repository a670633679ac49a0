//! Chapters command implementation.
//!
//! Prints the chapter (reading) order of every vertex reachable from the
//! start sentinel.

use std::path::Path;

use anyhow::Result;

use fabula_engine::chapter_order;

/// Execute the chapters command.
pub fn execute(file: &Path) -> Result<()> {
    let graph = super::load_graph(file)?;
    let order = chapter_order(&graph)?;

    for (index, id) in order.iter().enumerate() {
        let label = graph
            .get_vertex(*id)
            .map(|vertex| vertex.label().to_string())
            .unwrap_or_else(|| id.to_string());
        println!("{:>3}. {}", index + 1, label);
    }

    Ok(())
}
