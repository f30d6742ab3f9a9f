//! Incremental graph updates
//!
//! Applies a change set to the live graph in place: deleted files lose
//! their nodes and incident edges, modified files are dropped and
//! re-parsed, added files are parsed and appended. `contains` edges that
//! cross affected files are reconstructed from parent links; `imports`
//! edges are left to the next full cycle.

use crate::config::StrataConfig;
use crate::discovery::{discover_files, relative_to_root};
use crate::graph::{CodeGraph, Edge, EdgeKind};
use crate::hash_store::{ChangeSet, FileHashStore};
use crate::layering::{synthesize_layers, LayerInputs};
use crate::parser::ParserDispatcher;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome of one incremental apply. Never an error: faults are reported
/// through `success` and `message`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    pub success: bool,
    pub nodes_added: usize,
    pub nodes_removed: usize,
    pub nodes_modified: usize,
    pub files_processed: usize,
    pub duration_ms: u64,
    pub message: String,
}

/// Owns the hash store and parser dispatcher for one workspace; mutates
/// the live graph handed to `apply`.
pub struct GraphUpdater {
    root: PathBuf,
    config: StrataConfig,
    dispatcher: ParserDispatcher,
    hash_store: FileHashStore,
}

impl GraphUpdater {
    /// Create an updater, loading any persisted hash store.
    pub fn new(root: &Path, config: StrataConfig) -> Self {
        let hash_store = FileHashStore::load(root, &config.hash_algorithm);
        Self {
            root: root.to_path_buf(),
            config,
            dispatcher: ParserDispatcher::new(),
            hash_store,
        }
    }

    pub fn hash_store(&self) -> &FileHashStore {
        &self.hash_store
    }

    pub fn hash_store_mut(&mut self) -> &mut FileHashStore {
        &mut self.hash_store
    }

    /// Seed the hash store from a live graph when starting a fresh session,
    /// so unchanged files are not misreported as added.
    pub fn initialize(&mut self, existing_graph: Option<&CodeGraph>) {
        let Some(graph) = existing_graph else {
            return;
        };
        if !self.hash_store.is_empty() {
            return;
        }

        for rel in graph.files() {
            let abs = self.root.join(&rel);
            if !abs.exists() {
                continue;
            }
            let node_ids: Vec<String> = graph.nodes_in_file(&rel).map(|n| n.id.clone()).collect();
            if let Err(e) = self.hash_store.update_entry(&abs, node_ids) {
                tracing::warn!(file = %abs.display(), "seeding hash entry failed: {}", e);
            }
        }
        if let Err(e) = self.hash_store.save() {
            tracing::warn!("hash store save failed: {}", e);
        }
    }

    /// Detect pending changes against the working tree. Files present in
    /// the live graph but missing on disk count as deleted even when the
    /// hash store never recorded them.
    pub fn pending_changes(&mut self, live_graph: Option<&CodeGraph>) -> ChangeSet {
        let files = discover_files(
            &self.root,
            &self.config.extensions(),
            &self.config.exclude_globs,
        )
        .unwrap_or_default();

        let mut changes = self.hash_store.detect_changes(&files);

        if let Some(graph) = live_graph {
            for rel in graph.files() {
                let abs = self.root.join(&rel);
                if !abs.exists() && !changes.deleted.contains(&abs) {
                    changes.deleted.push(abs);
                }
            }
            changes.deleted.sort();
        }

        changes
    }

    /// Apply a change set to the live graph in place.
    pub fn apply(&mut self, graph: &mut CodeGraph, changes: &ChangeSet) -> UpdateReport {
        let started = Instant::now();
        let mut nodes_added = 0usize;
        let mut nodes_removed = 0usize;
        let mut nodes_modified = 0usize;
        let mut faults: Vec<String> = Vec::new();
        let mut affected_ids: HashSet<String> = HashSet::new();

        for abs in &changes.deleted {
            let rel = relative_to_root(abs, &self.root);
            // Removal is by file path, not by the recorded id list, which
            // may be stale.
            let dropped = graph.remove_file_nodes(&rel);
            nodes_removed += dropped.len();
            self.hash_store.remove_entry(abs);
        }

        for abs in &changes.modified {
            let rel = relative_to_root(abs, &self.root);
            graph.remove_file_nodes(&rel);
            let fresh = self.reparse_into(graph, abs, &mut affected_ids, &mut faults);
            nodes_modified += fresh;
        }

        for abs in &changes.added {
            let fresh = self.reparse_into(graph, abs, &mut affected_ids, &mut faults);
            nodes_added += fresh;
        }

        self.rebuild_contains_edges(graph, &affected_ids);

        // Re-run layer synthesis so freshly parsed nodes rejoin their
        // framework chains. The dependency map is not maintained here, so
        // bootstrap-BFS containment (like `imports` edges) is restored on
        // the next full cycle.
        let empty_deps = HashMap::new();
        synthesize_layers(
            graph,
            &LayerInputs {
                dep_map: &empty_deps,
                primary_file: None,
            },
        );

        if let Err(e) = self.hash_store.save() {
            faults.push(format!("hash store save failed: {}", e));
        }

        let files_processed = changes.changed_count();
        let success = faults.is_empty();
        let message = if success {
            format!("applied {} file change(s)", files_processed)
        } else {
            faults.join("; ")
        };

        UpdateReport {
            success,
            nodes_added,
            nodes_removed,
            nodes_modified,
            files_processed,
            duration_ms: started.elapsed().as_millis() as u64,
            message,
        }
    }

    /// Drop the hash store so the next cycle re-analyzes everything.
    pub fn force_full_refresh(&mut self) {
        self.hash_store.clear();
        if let Err(e) = self.hash_store.save() {
            tracing::warn!("hash store save failed: {}", e);
        }
    }

    /// Parse one file and append its non-duplicate nodes and intra-file
    /// edges. Returns the number of nodes appended.
    fn reparse_into(
        &mut self,
        graph: &mut CodeGraph,
        abs: &Path,
        affected_ids: &mut HashSet<String>,
        faults: &mut Vec<String>,
    ) -> usize {
        let outcome = self.dispatcher.parse_path(abs, &self.root, false);
        for diagnostic in &outcome.diagnostics {
            tracing::warn!(file = %diagnostic.file.display(), "{}", diagnostic.message);
        }

        let mut fresh = 0usize;
        let mut file_node_ids = Vec::new();
        for node in outcome.nodes {
            let id = node.id.clone();
            file_node_ids.push(id.clone());
            if graph.add_node(node) {
                fresh += 1;
                affected_ids.insert(id);
            }
        }
        for edge in outcome.edges {
            graph.add_edge(edge);
        }

        if let Err(e) = self.hash_store.update_entry(abs, file_node_ids) {
            faults.push(format!("{}: {}", abs.display(), e));
        }
        fresh
    }

    /// Reconnect parent links that touch affected files: add missing
    /// `contains` edges once, and clear parent links that no longer
    /// resolve. Edges not involving an affected file are untouched.
    fn rebuild_contains_edges(&self, graph: &mut CodeGraph, affected_ids: &HashSet<String>) {
        let mut to_connect: Vec<(String, String)> = Vec::new();
        let mut to_clear: Vec<String> = Vec::new();

        for node in graph.nodes() {
            let Some(parent) = node.parent.as_deref() else {
                continue;
            };
            if !graph.contains_id(parent) {
                to_clear.push(node.id.clone());
                continue;
            }
            let involves_affected =
                affected_ids.contains(&node.id) || affected_ids.contains(parent);
            if involves_affected && !graph.has_edge(parent, &node.id, EdgeKind::Contains) {
                to_connect.push((parent.to_string(), node.id.clone()));
            }
        }

        for (parent, child) in to_connect {
            graph.add_edge(Edge::new(parent, child, EdgeKind::Contains));
        }
        for id in to_clear {
            if let Some(node) = graph.node_mut(&id) {
                node.parent = None;
            }
        }
    }
}
