//! Convert command implementation.
//!
//! Parses a graph file and re-emits it in the codec's normalized block
//! order, either to stdout or to a file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Execute the convert command.
pub fn execute(file: &Path, output: Option<PathBuf>) -> Result<()> {
    let graph = super::load_graph(file)?;
    let text = fabula_adot::emit(&graph);

    match output {
        Some(path) => {
            std::fs::write(&path, &text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("💾 Saved to: {}", path.display());
        }
        None => print!("{text}"),
    }

    Ok(())
}
