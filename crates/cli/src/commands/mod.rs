//! CLI commands

pub mod index;
pub mod refresh;
pub mod status;
pub mod update;
pub mod watch;

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};
use strata_core::{artifacts, AnalysisResult, CodeGraph, GraphSnapshot};

/// Canonicalized workspace root for a command
pub(crate) fn workspace_root(path: Option<&Path>) -> PathBuf {
    let root = path.unwrap_or_else(|| Path::new("."));
    std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf())
}

/// Load the persisted graph snapshot, if an index exists
pub(crate) fn load_cached_graph(root: &Path) -> Option<CodeGraph> {
    let contents = std::fs::read_to_string(artifacts::graph_path(root)).ok()?;
    let snapshot: GraphSnapshot = serde_json::from_str(&contents).ok()?;
    Some(snapshot.restore())
}

/// One-line analysis summary shared by index/refresh/watch
pub(crate) fn print_analysis_summary(result: &AnalysisResult, elapsed_ms: u128) {
    if result.guarded {
        for warning in &result.warnings {
            eprintln!("  {} {}", "skipped:".yellow(), warning);
        }
        return;
    }

    let entries = result.graph.nodes().filter(|n| n.is_entry).count();
    eprintln!(
        "  {} {} nodes, {} edges, {} entry node(s) in {}ms",
        "indexed".green().bold(),
        result.graph.node_count(),
        result.graph.edge_count(),
        entries,
        elapsed_ms,
    );
    if !result.diagnostics.is_empty() {
        eprintln!(
            "  {} {} file(s) reported parse problems",
            "note:".yellow(),
            result.diagnostics.len()
        );
    }
    for warning in &result.warnings {
        eprintln!("  {} {}", "warning:".yellow(), warning);
    }
}
