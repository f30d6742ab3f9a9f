//! Strata CLI - code graph indexer host

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Index a workspace into an architecture-aware code graph", long_about = None)]
#[command(version = strata_core::VERSION)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full analysis and persist the graph artifacts (default)
    Index {
        /// Path to the workspace (default: current directory)
        path: Option<PathBuf>,
    },

    /// Show pending changes against the cached graph
    Status {
        /// Path to the workspace (default: current directory)
        path: Option<PathBuf>,
    },

    /// Apply pending changes to the cached graph incrementally
    Update {
        /// Path to the workspace (default: current directory)
        path: Option<PathBuf>,
    },

    /// Clear all caches and re-analyze from scratch
    Refresh {
        /// Path to the workspace (default: current directory)
        path: Option<PathBuf>,
    },

    /// Watch the workspace and keep the graph synchronized
    Watch {
        /// Path to the workspace (default: current directory)
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Index { path }) => commands::index::run(path.as_deref()),
        Some(Commands::Status { path }) => commands::status::run(path.as_deref()),
        Some(Commands::Update { path }) => commands::update::run(path.as_deref()),
        Some(Commands::Refresh { path }) => commands::refresh::run(path.as_deref()),
        Some(Commands::Watch { path }) => commands::watch::run(path.as_deref()),
        None => commands::index::run(None),
    }
}
