//! Watch command — keep the graph synchronized with the working tree
//!
//! The watchers enqueue debounced events; this loop selects an update
//! strategy per event and drives the updater, the branch manager, or a
//! full re-analysis accordingly.

use super::{print_analysis_summary, workspace_root};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use strata_core::{
    artifacts, select_strategy, watcher::git_dir_of, BranchManager, ChangeEvent, CodeGraph,
    EventBus, FileWatcher, GraphSnapshot, GraphUpdater, ScmWatcher, StrataConfig, SwitchOutcome,
    UpdateStrategy, WorkspaceAnalyzer,
};

pub fn run(path: Option<&Path>) -> Result<()> {
    let root = workspace_root(path);
    let config = StrataConfig::find_and_load(&root).unwrap_or_default();

    eprintln!(
        "{}",
        format!("  strata v{} — watch mode", strata_core::VERSION).bold()
    );

    // ── Initial full analysis ──────────────────────────────────
    let analyzer = WorkspaceAnalyzer::new(config.clone());
    let started = Instant::now();
    let result = analyzer.analyze(&root);
    print_analysis_summary(&result, started.elapsed().as_millis());
    let mut graph = result.graph;

    let mut updater = GraphUpdater::new(&root, config.clone());
    updater.initialize(Some(&graph));

    let branches = Arc::new(Mutex::new(BranchManager::new(&root)));

    // ── Event plumbing ─────────────────────────────────────────
    let bus: EventBus<ChangeEvent> = EventBus::new();
    let (tx, rx) = std::sync::mpsc::channel();
    let _subscription = bus.subscribe(move |event: &ChangeEvent| {
        let _ = tx.send(event.clone());
    });

    let _file_watcher = FileWatcher::start(&root, &config, bus.clone())?;
    let _scm_watcher = match git_dir_of(&root) {
        Some(git_dir) => {
            let classifier = Arc::clone(&branches);
            Some(ScmWatcher::start(&git_dir, &config, bus.clone(), move || {
                classifier
                    .lock()
                    .map(|mut b| b.classify_head_change())
                    .unwrap_or_default()
            })?)
        }
        None => {
            eprintln!(
                "  {}",
                "not a repository — branch tracking disabled".dimmed()
            );
            None
        }
    };

    // ── Ctrl-C handler ─────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    })?;

    eprintln!("  {}", "Watching for changes... (Ctrl-C to stop)".dimmed());

    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(event) => {
                handle_event(&event, &root, &config, &analyzer, &mut graph, &mut updater, &branches);
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    eprintln!("  {}", "Stopped watching.".bold());
    Ok(())
}

fn handle_event(
    event: &ChangeEvent,
    root: &Path,
    config: &StrataConfig,
    analyzer: &WorkspaceAnalyzer,
    graph: &mut CodeGraph,
    updater: &mut GraphUpdater,
    branches: &Arc<Mutex<BranchManager>>,
) {
    let changes = updater.pending_changes(Some(&*graph));

    match select_strategy(event, changes.changed_count(), config) {
        UpdateStrategy::NoUpdate => {}

        UpdateStrategy::Incremental => {
            if !changes.has_changes() {
                return;
            }
            let report = updater.apply(graph, &changes);
            if report.success {
                eprintln!(
                    "  {} +{} ~{} -{} node(s) across {} file(s)",
                    "synced".green(),
                    report.nodes_added,
                    report.nodes_modified,
                    report.nodes_removed,
                    report.files_processed,
                );
            } else {
                eprintln!("  {} {}", "sync failed:".red(), report.message);
            }
            persist(root, graph);
        }

        UpdateStrategy::BranchCache => {
            let ChangeEvent::BranchSwitch { from, to, .. } = event else {
                return;
            };
            let outcome = branches
                .lock()
                .map_err(|e| anyhow::anyhow!("branch manager poisoned: {}", e))
                .and_then(|mut b| {
                    b.switch_branch(from.as_deref(), to, graph, updater.hash_store_mut())
                        .map_err(Into::into)
                });
            match outcome {
                Ok(SwitchOutcome::Restored(restored)) => {
                    *graph = restored;
                    // Reconcile the snapshot against the working tree
                    let pending = updater.pending_changes(Some(&*graph));
                    if pending.has_changes() {
                        updater.apply(graph, &pending);
                    }
                    eprintln!("  {} branch {}", "restored".green(), to.bold());
                    persist(root, graph);
                }
                Ok(SwitchOutcome::FullRefreshRequired) | Err(_) => {
                    full_refresh(root, analyzer, graph, updater);
                }
            }
        }

        UpdateStrategy::FullRefresh => {
            if let ChangeEvent::BranchSwitch { from, to, .. } = event {
                // Preserve the branch being left before re-analyzing
                if let (Some(from), Ok(mut b)) = (from.as_deref(), branches.lock()) {
                    let snapshot = GraphSnapshot::capture(graph, artifacts::now_rfc3339());
                    if let Err(e) =
                        b.save_snapshot(from, &snapshot, updater.hash_store().digest_map())
                    {
                        eprintln!("  {} saving snapshot: {}", "warning:".yellow(), e);
                    }
                }
                eprintln!("  {} branch {} (no snapshot)", "switch".yellow(), to.bold());
            }
            full_refresh(root, analyzer, graph, updater);
        }
    }
}

fn full_refresh(
    root: &Path,
    analyzer: &WorkspaceAnalyzer,
    graph: &mut CodeGraph,
    updater: &mut GraphUpdater,
) {
    let started = Instant::now();
    let result = analyzer.analyze(root);
    if result.guarded {
        print_analysis_summary(&result, started.elapsed().as_millis());
        return;
    }
    *graph = result.graph;
    updater.hash_store_mut().clear();
    updater.initialize(Some(&*graph));
    eprintln!(
        "  {} {} nodes, {} edges in {}ms",
        "re-indexed".green().bold(),
        graph.node_count(),
        graph.edge_count(),
        started.elapsed().as_millis(),
    );
}

fn persist(root: &Path, graph: &CodeGraph) {
    let snapshot = GraphSnapshot::capture(graph, artifacts::now_rfc3339());
    if let Err(e) = artifacts::persist(root, &snapshot) {
        eprintln!("  {} persisting artifacts: {}", "warning:".yellow(), e);
    }
}
