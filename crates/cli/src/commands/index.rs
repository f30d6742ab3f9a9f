//! Index command — full analysis of the workspace

use super::{print_analysis_summary, workspace_root};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::time::Instant;
use strata_core::{StrataConfig, WorkspaceAnalyzer};

pub fn run(path: Option<&Path>) -> Result<()> {
    let root = workspace_root(path);
    let config = StrataConfig::find_and_load(&root).unwrap_or_default();

    eprintln!(
        "{}",
        format!("  strata v{} — {}", strata_core::VERSION, root.display()).bold()
    );

    let started = Instant::now();
    let analyzer = WorkspaceAnalyzer::new(config);
    let result = analyzer.analyze(&root);
    print_analysis_summary(&result, started.elapsed().as_millis());

    if !result.guarded {
        eprintln!(
            "  {} {}",
            "artifacts:".dimmed(),
            strata_core::artifacts::strata_dir(&root).display()
        );
    }
    Ok(())
}
