//! Fabula CLI - inspect, normalize, walk, and order branching-story graphs.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

mod commands;

/// Fabula CLI - tools for aDOT graph files.
///
/// A graph file describes a branching story: vertices framed by the
/// `__BEGIN__`/`__END__` sentinels, edges, and strategy bindings.
#[derive(Parser, Debug)]
#[command(
    name = "fabula",
    author,
    version,
    about = "Fabula: branching-story graph tools",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show a summary of a graph file.
    Show {
        /// Path to the aDOT file.
        file: PathBuf,

        /// Print the structural projection as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Parse a graph file and re-emit it in normalized form.
    Convert {
        /// Path to the aDOT file.
        file: PathBuf,

        /// Output path (stdout when omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Execute a graph from its start sentinel to its end sentinel.
    Walk {
        /// Path to the aDOT file.
        file: PathBuf,

        /// Maximum number of steps before aborting.
        #[arg(long, default_value_t = 10_000)]
        max_steps: usize,
    },

    /// Print the chapter (reading) order of a graph.
    Chapters {
        /// Path to the aDOT file.
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Show { file, json } => commands::show::execute(&file, json),
        Commands::Convert { file, output } => commands::convert::execute(&file, output),
        Commands::Walk { file, max_steps } => commands::walk::execute(&file, max_steps),
        Commands::Chapters { file } => commands::chapters::execute(&file),
    }
}
