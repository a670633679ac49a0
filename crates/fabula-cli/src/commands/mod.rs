//! CLI command implementations.

use std::path::Path;

use anyhow::{Context, Result};

use fabula_adot::{parse, ParseOptions};
use fabula_core::{Graph, Registry};

pub mod chapters;
pub mod convert;
pub mod show;
pub mod walk;

/// Load a graph from an aDOT file with the standard strategy registry.
pub(crate) fn load_graph(path: &Path) -> Result<Graph> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let graph = parse(&text, Registry::standard(), ParseOptions::default())
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(graph)
}
