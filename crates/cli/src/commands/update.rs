//! Update command — incremental apply of pending changes

use super::{load_cached_graph, workspace_root};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use strata_core::{artifacts, GraphSnapshot, GraphUpdater, StrataConfig};

pub fn run(path: Option<&Path>) -> Result<()> {
    let root = workspace_root(path);
    let config = StrataConfig::find_and_load(&root).unwrap_or_default();

    let Some(mut graph) = load_cached_graph(&root) else {
        eprintln!(
            "  {} no index found — run {} first",
            "note:".yellow(),
            "strata index".bold()
        );
        return Ok(());
    };

    let mut updater = GraphUpdater::new(&root, config);
    updater.initialize(Some(&graph));
    let changes = updater.pending_changes(Some(&graph));

    if !changes.has_changes() {
        eprintln!("  {}", "up to date".green().bold());
        return Ok(());
    }

    let report = updater.apply(&mut graph, &changes);
    if report.success {
        eprintln!(
            "  {} +{} nodes, -{} nodes, ~{} modified across {} file(s) in {}ms",
            "updated".green().bold(),
            report.nodes_added,
            report.nodes_removed,
            report.nodes_modified,
            report.files_processed,
            report.duration_ms,
        );
    } else {
        eprintln!("  {} {}", "update failed:".red().bold(), report.message);
    }

    let snapshot = GraphSnapshot::capture(&graph, artifacts::now_rfc3339());
    artifacts::persist(&root, &snapshot)?;
    Ok(())
}
