//! Status command — pending changes against the cached graph

use super::{load_cached_graph, workspace_root};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use strata_core::{GraphUpdater, StrataConfig};

pub fn run(path: Option<&Path>) -> Result<()> {
    let root = workspace_root(path);
    let config = StrataConfig::find_and_load(&root).unwrap_or_default();

    let graph = load_cached_graph(&root);
    if graph.is_none() {
        eprintln!(
            "  {} no index found — run {} first",
            "note:".yellow(),
            "strata index".bold()
        );
        return Ok(());
    }

    let mut updater = GraphUpdater::new(&root, config);
    updater.initialize(graph.as_ref());
    let changes = updater.pending_changes(graph.as_ref());

    if !changes.has_changes() {
        eprintln!(
            "  {} ({} file(s) unchanged)",
            "up to date".green().bold(),
            changes.unchanged.len()
        );
        return Ok(());
    }

    for file in &changes.added {
        println!("  {}  {}", "A".green().bold(), file.display());
    }
    for file in &changes.modified {
        println!("  {}  {}", "M".yellow().bold(), file.display());
    }
    for file in &changes.deleted {
        println!("  {}  {}", "D".red().bold(), file.display());
    }
    eprintln!(
        "  {} added, {} modified, {} deleted, {} unchanged",
        changes.added.len(),
        changes.modified.len(),
        changes.deleted.len(),
        changes.unchanged.len()
    );
    Ok(())
}
