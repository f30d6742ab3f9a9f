//! Workspace analyzer: orchestrates one full analysis cycle
//!
//! Single-writer: concurrent cycles and cycles scheduled too soon after the
//! previous one are rejected with an empty sentinel result. Readers consume
//! the published snapshot handle between cycles.

use crate::artifacts;
use crate::config::StrataConfig;
use crate::discovery::{discover_files, relative_to_root};
use crate::entry::EntryDetector;
use crate::graph::{CodeGraph, Edge, EdgeKind, GraphSnapshot, Layer, Node, NodeKind};
use crate::layering::{synthesize_layers, LayerInputs};
use crate::parser::{Diagnostic, ParserDispatcher};
use crate::resolve::ImportResolver;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

/// What one analysis cycle produced
#[derive(Debug)]
pub struct AnalysisResult {
    pub graph: CodeGraph,
    pub diagnostics: Vec<Diagnostic>,
    pub warnings: Vec<String>,

    /// True when a guard rejected the cycle and the result is the sentinel
    pub guarded: bool,
}

impl AnalysisResult {
    fn sentinel(root: &Path, warning: impl Into<String>) -> Self {
        Self {
            graph: CodeGraph::new(root.to_path_buf()),
            diagnostics: Vec::new(),
            warnings: vec![warning.into()],
            guarded: true,
        }
    }
}

/// Stateless between cycles apart from the writer guard and the published
/// snapshot. One instance per workspace, owned by the host.
pub struct WorkspaceAnalyzer {
    config: StrataConfig,
    dispatcher: ParserDispatcher,
    detector: EntryDetector,
    running: AtomicBool,
    last_cycle: Mutex<Option<Instant>>,
    published: RwLock<Arc<GraphSnapshot>>,
}

impl WorkspaceAnalyzer {
    pub fn new(config: StrataConfig) -> Self {
        Self {
            config,
            dispatcher: ParserDispatcher::new(),
            detector: EntryDetector::new(),
            running: AtomicBool::new(false),
            last_cycle: Mutex::new(None),
            published: RwLock::new(Arc::new(GraphSnapshot::empty(PathBuf::new()))),
        }
    }

    pub fn config(&self) -> &StrataConfig {
        &self.config
    }

    /// The immutable snapshot readers consume between cycles
    pub fn snapshot(&self) -> Arc<GraphSnapshot> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Parse a single file without touching the live graph. Unknown
    /// extensions yield an empty list.
    pub fn analyze_file(&self, path: &Path, root: &Path) -> Vec<Node> {
        self.dispatcher.parse_path(path, root, false).nodes
    }

    /// Run one full analysis cycle over the workspace.
    pub fn analyze(&self, root: &Path) -> AnalysisResult {
        if self.running.swap(true, Ordering::SeqCst) {
            return AnalysisResult::sentinel(root, "analysis already in progress");
        }

        {
            let last = self.last_cycle.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(at) = *last {
                let min = Duration::from_millis(self.config.min_analysis_interval_ms);
                if at.elapsed() < min {
                    self.running.store(false, Ordering::SeqCst);
                    return AnalysisResult::sentinel(
                        root,
                        "analysis requested too soon after the previous cycle",
                    );
                }
            }
        }

        let result = self.run_cycle(root);

        *self.last_cycle.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
        self.running.store(false, Ordering::SeqCst);
        result
    }

    fn run_cycle(&self, root: &Path) -> AnalysisResult {
        let started = Instant::now();
        let mut diagnostics = Vec::new();
        let mut warnings = Vec::new();

        // ── 1+2. File enumeration and entry detection ────────────────────
        let files = match discover_files(root, &self.config.extensions(), &self.config.exclude_globs)
        {
            Ok(files) => files,
            Err(e) => {
                warnings.push(format!("file enumeration failed: {}", e));
                Vec::new()
            }
        };
        let entries = self.detector.detect(&files);
        let entry_files: Vec<PathBuf> = entries
            .iter()
            .map(|e| relative_to_root(&e.file, root))
            .collect();
        let primary_file: Option<PathBuf> = entries
            .iter()
            .find(|e| e.is_primary)
            .map(|e| relative_to_root(&e.file, root));

        // ── 3. Parse pass (parallel, per-file isolation) ─────────────────
        let entry_set: std::collections::HashSet<PathBuf> =
            entries.iter().map(|e| e.file.clone()).collect();
        let outcomes = self
            .dispatcher
            .parse_files_parallel(&files, root, |f| entry_set.contains(f));

        let mut graph = CodeGraph::new(root.to_path_buf());
        for (_, outcome) in &outcomes {
            for node in &outcome.nodes {
                graph.add_node(node.clone());
            }
        }
        for (_, outcome) in &outcomes {
            for edge in &outcome.edges {
                graph.add_edge(edge.clone());
            }
            diagnostics.extend(outcome.diagnostics.iter().cloned());
        }

        // ── 4. Import pass: module-to-module edges + dependency map ──────
        let resolver = ImportResolver::new(root, &files, &self.config);
        let mut dep_map: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();
        for (rel, outcome) in &outcomes {
            let abs = root.join(rel);
            let src_module = crate::parser::module_id_for(rel);
            for literal in &outcome.import_literals {
                let Some(target_abs) = resolver.resolve(&abs, literal) else {
                    continue; // external import, silently dropped
                };
                let target_rel = relative_to_root(&target_abs, root);
                if target_rel == *rel {
                    continue;
                }
                let deps = dep_map.entry(rel.clone()).or_default();
                if !deps.contains(&target_rel) {
                    deps.push(target_rel.clone());
                }
                let target_module = crate::parser::module_id_for(&target_rel);
                graph.add_edge(Edge::new(
                    src_module.clone(),
                    target_module,
                    EdgeKind::Imports,
                ));
            }
        }

        // ── 5. Entry flagging ────────────────────────────────────────────
        self.flag_entries(&mut graph, &entry_files, primary_file.as_deref());

        // ── 6. Layer synthesis ───────────────────────────────────────────
        let inputs = LayerInputs {
            dep_map: &dep_map,
            primary_file: primary_file.as_deref(),
        };
        synthesize_layers(&mut graph, &inputs);

        // ── 7. Graph construction ────────────────────────────────────────
        let entry_roots: Vec<String> = entry_files
            .iter()
            .flat_map(|f| graph.nodes_in_file(f).map(|n| n.id.clone()))
            .collect();
        graph.retain_reachable(&entry_roots);

        // Publish and persist for downstream readers
        let snapshot = GraphSnapshot::capture(&graph, chrono::Utc::now().to_rfc3339());
        *self.published.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(snapshot.clone());
        if let Err(e) = artifacts::persist(root, &snapshot) {
            tracing::warn!("failed to persist graph artifacts: {}", e);
            warnings.push(format!("artifact persistence failed: {}", e));
        }

        tracing::debug!(
            files = files.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            ms = started.elapsed().as_millis() as u64,
            "analysis cycle complete"
        );

        AnalysisResult {
            graph,
            diagnostics,
            warnings,
            guarded: false,
        }
    }

    /// Step 5: flag entry nodes, then choose the single primary.
    fn flag_entries(
        &self,
        graph: &mut CodeGraph,
        entry_files: &[PathBuf],
        primary_file: Option<&Path>,
    ) {
        // Parser-level primary hints are advisory; the assembler decides.
        let hinted: Vec<String> = graph
            .nodes()
            .filter(|n| n.is_primary_entry)
            .map(|n| n.id.clone())
            .collect();
        for id in hinted {
            if let Some(node) = graph.node_mut(&id) {
                node.is_primary_entry = false;
            }
        }

        for file in entry_files {
            let mut flagged: Vec<String> = graph
                .nodes_in_file(file)
                .filter(|n| n.parent.is_none())
                .map(|n| n.id.clone())
                .collect();
            if flagged.is_empty() {
                // No top-level nodes: flag the first node of the file
                flagged = graph
                    .nodes_in_file(file)
                    .map(|n| n.id.clone())
                    .min()
                    .into_iter()
                    .collect();
            }
            for id in flagged {
                if let Some(node) = graph.node_mut(&id) {
                    node.is_entry = true;
                }
            }
        }

        if let Some(primary_id) = select_primary_node(graph, primary_file) {
            if let Some(node) = graph.node_mut(&primary_id) {
                node.is_entry = true;
                node.is_primary_entry = true;
            }
        }
    }
}

/// Choose the node that carries `is_primary_entry`.
///
/// A class bearing the framework application annotation is promoted ahead
/// of anything else; otherwise the primary file's app-layer node wins, then
/// its module node, then its first node.
fn select_primary_node(graph: &CodeGraph, primary_file: Option<&Path>) -> Option<String> {
    let promoted = graph
        .nodes()
        .filter(|n| {
            n.kind == NodeKind::Class
                && (n
                    .attrs
                    .decorators
                    .iter()
                    .any(|d| d.ends_with("SpringBootApplication"))
                    || n.attrs
                        .description
                        .as_deref()
                        .is_some_and(|d| d.contains("SpringBootApplication")))
        })
        .map(|n| n.id.clone())
        .min();
    if promoted.is_some() {
        return promoted;
    }

    let file = primary_file?;

    let app_layer = graph
        .nodes_in_file(file)
        .filter(|n| matches!(n.layer, Some(Layer::App) | Some(Layer::Application)))
        .map(|n| (n.kind == NodeKind::Module, n.id.clone()))
        .min(); // non-module nodes sort first
    if let Some((_, id)) = app_layer {
        return Some(id);
    }

    let module = graph
        .nodes_in_file(file)
        .find(|n| n.kind == NodeKind::Module)
        .map(|n| n.id.clone());
    if module.is_some() {
        return module;
    }

    graph.nodes_in_file(file).map(|n| n.id.clone()).min()
}
