//! Walk command implementation.
//!
//! Executes a graph start to end with the standard strategy registry and
//! prints the path taken.

use std::path::Path;

use anyhow::Result;

use fabula_engine::{WalkConfig, Walker};

/// Execute the walk command.
pub fn execute(file: &Path, max_steps: usize) -> Result<()> {
    let mut graph = super::load_graph(file)?;

    let outcome = Walker::with_config(&mut graph, WalkConfig { max_steps }).run()?;

    let rendered: Vec<String> = outcome.path.iter().map(|id| id.to_string()).collect();
    println!("🚶 {}", rendered.join(" -> "));
    println!("   Steps: {}", outcome.steps);

    Ok(())
}
