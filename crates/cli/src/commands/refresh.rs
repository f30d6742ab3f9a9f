//! Refresh command — wipe caches and re-analyze from scratch

use super::{print_analysis_summary, workspace_root};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::time::Instant;
use strata_core::{BranchManager, GraphUpdater, StrataConfig, WorkspaceAnalyzer};

pub fn run(path: Option<&Path>) -> Result<()> {
    let root = workspace_root(path);
    let config = StrataConfig::find_and_load(&root).unwrap_or_default();

    let mut updater = GraphUpdater::new(&root, config.clone());
    updater.force_full_refresh();

    let mut branches = BranchManager::new(&root);
    if let Err(e) = branches.clear() {
        eprintln!("  {} clearing branch snapshots: {}", "warning:".yellow(), e);
    }

    eprintln!("  {}", "caches cleared, re-analyzing".dimmed());
    let started = Instant::now();
    let analyzer = WorkspaceAnalyzer::new(config);
    let result = analyzer.analyze(&root);
    print_analysis_summary(&result, started.elapsed().as_millis());
    Ok(())
}
