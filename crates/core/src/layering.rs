//! Framework-aware layer synthesis
//!
//! Runs after the parse and import passes. Buckets top-level nodes by layer
//! tag and creates the hierarchical `contains` backbone for each supported
//! framework family, synthesizing a virtual root when the top layer is
//! absent.

use crate::graph::{CodeGraph, Language, Layer, Node, NodeKind};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// Spring-style chain, application down to entity
const JVM_CHAIN: &[Layer] = &[
    Layer::Application,
    Layer::Controller,
    Layer::Service,
    Layer::Repository,
    Layer::Entity,
];

/// Async-web chain, app down to model
const ASYNC_WEB_CHAIN: &[Layer] = &[
    Layer::App,
    Layer::Router,
    Layer::Endpoint,
    Layer::Service,
    Layer::Repository,
    Layer::Model,
];

const BROWSER_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// Inputs carried from the assembler's earlier passes
pub struct LayerInputs<'a> {
    /// file -> files it imports (workspace-relative)
    pub dep_map: &'a HashMap<PathBuf, Vec<PathBuf>>,

    /// Workspace-relative path of the primary entry file, if any
    pub primary_file: Option<&'a Path>,
}

/// Apply every family's synthesis to the graph in a fixed order.
pub fn synthesize_layers(graph: &mut CodeGraph, inputs: &LayerInputs) {
    jvm_chain(graph);
    async_web_chain(graph);
    browser_bootstrap(graph, inputs);
    annotated_browser_chain(graph, inputs);
}

// ── JVM family ───────────────────────────────────────────────────────────

fn jvm_chain(graph: &mut CodeGraph) {
    let mut buckets = collect_buckets(graph, JVM_CHAIN, |n| {
        n.language == Language::Java && n.kind != NodeKind::Module
    });

    let lower_layers_present = buckets[1..].iter().any(|b| !b.is_empty());
    if buckets[0].is_empty() && lower_layers_present {
        let root_id = add_virtual_root(graph, "Main", Language::Java);
        buckets[0].push(root_id);
    }

    link_chain(graph, &buckets);
}

// ── Async-web family ─────────────────────────────────────────────────────

fn async_web_chain(graph: &mut CodeGraph) {
    let mut buckets = collect_buckets(graph, ASYNC_WEB_CHAIN, |n| {
        n.language == Language::Python
    });

    // Modules participate only at the app tier
    for bucket in buckets.iter_mut().skip(1) {
        bucket.retain(|id| {
            graph
                .node(id)
                .is_some_and(|n| n.kind != NodeKind::Module)
        });
    }

    let lower_layers_present = buckets[1..].iter().any(|b| !b.is_empty());
    if buckets[0].is_empty() && lower_layers_present {
        let root_id = add_virtual_root(graph, "App", Language::Python);
        buckets[0].push(root_id);
    }

    link_chain(graph, &buckets);
}

// ── Browser bootstrap walk ───────────────────────────────────────────────

/// BFS over the file-dependency map from the primary entry's module,
/// attaching each visited file's unparented module node under the caller
/// with a contains edge labelled `imports`. A visited set breaks cycles.
fn browser_bootstrap(graph: &mut CodeGraph, inputs: &LayerInputs) {
    let Some(primary) = inputs.primary_file else {
        return;
    };
    let is_browser = primary
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| BROWSER_EXTENSIONS.contains(&e));
    if !is_browser {
        return;
    }

    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    visited.insert(primary.to_path_buf());
    queue.push_back(primary.to_path_buf());

    while let Some(caller) = queue.pop_front() {
        let Some(deps) = inputs.dep_map.get(&caller) else {
            continue;
        };
        let caller_module = module_id_of(graph, &caller);

        for dep in deps {
            if !visited.insert(dep.clone()) {
                continue; // revisits are suppressed
            }
            queue.push_back(dep.clone());

            let (Some(caller_id), Some(dep_id)) =
                (caller_module.clone(), module_id_of(graph, dep))
            else {
                continue;
            };
            let unparented = graph.node(&dep_id).is_some_and(|n| n.parent.is_none());
            if unparented {
                graph.set_parent(&dep_id, &caller_id, Some("imports"));
            }
        }
    }
}

// ── Framework-annotated browser family ───────────────────────────────────

/// entry → module → {component, directive, pipe}; module → service;
/// module → guard.
fn annotated_browser_chain(graph: &mut CodeGraph, inputs: &LayerInputs) {
    let modules = layer_bucket(graph, Layer::Module, |n| is_browser_node(n));
    if modules.is_empty() {
        return;
    }

    // Attach framework modules under the entry file's module node
    if let Some(primary) = inputs.primary_file {
        if let Some(entry_id) = module_id_of(graph, primary) {
            for module in &modules {
                let unparented = graph.node(module).is_some_and(|n| n.parent.is_none());
                if unparented && *module != entry_id {
                    graph.set_parent(module, &entry_id, None);
                }
            }
        }
    }

    for layer in [
        Layer::Component,
        Layer::Directive,
        Layer::Pipe,
        Layer::Service,
        Layer::Guard,
    ] {
        let children = layer_bucket(graph, layer, |n| is_browser_node(n));
        link_chain(graph, &[modules.clone(), children]);
    }
}

fn is_browser_node(node: &Node) -> bool {
    matches!(
        node.language,
        Language::TypeScript | Language::JavaScript
    ) && node.kind != NodeKind::Module
}

// ── Shared helpers ───────────────────────────────────────────────────────

/// Top-level nodes (no parent) bucketed by chain position, id-sorted
fn collect_buckets(
    graph: &CodeGraph,
    chain: &[Layer],
    filter: impl Fn(&Node) -> bool,
) -> Vec<Vec<String>> {
    chain
        .iter()
        .map(|&layer| {
            let mut ids: Vec<String> = graph
                .nodes()
                .filter(|n| n.parent.is_none() && n.layer == Some(layer) && filter(n))
                .map(|n| n.id.clone())
                .collect();
            ids.sort();
            ids
        })
        .collect()
}

fn layer_bucket(
    graph: &CodeGraph,
    layer: Layer,
    filter: impl Fn(&Node) -> bool,
) -> Vec<String> {
    let mut ids: Vec<String> = graph
        .nodes()
        .filter(|n| n.layer == Some(layer) && filter(n))
        .map(|n| n.id.clone())
        .collect();
    ids.sort();
    ids
}

/// Link each present layer to the next-higher present layer. A child binds
/// only when unparented, to the first still-unparented node of the higher
/// layer (falling back to its first node).
fn link_chain(graph: &mut CodeGraph, buckets: &[Vec<String>]) {
    let present: Vec<&Vec<String>> = buckets.iter().filter(|b| !b.is_empty()).collect();

    for pair in present.windows(2) {
        let (higher, lower) = (pair[0], pair[1]);
        for child_id in lower {
            let unparented = graph
                .node(child_id)
                .is_some_and(|n| n.parent.is_none());
            if !unparented {
                continue;
            }
            let parent_id = higher
                .iter()
                .find(|id| graph.node(id).is_some_and(|n| n.parent.is_none()))
                .or_else(|| higher.first())
                .cloned();
            if let Some(parent_id) = parent_id {
                if parent_id != *child_id {
                    graph.set_parent(child_id, &parent_id, None);
                }
            }
        }
    }
}

/// Synthesize a virtual module to root a chain whose top layer is absent.
/// It becomes the primary entry when no node holds that flag yet.
fn add_virtual_root(graph: &mut CodeGraph, label: &str, language: Language) -> String {
    let id = format!("virtual:module:{}", label);
    if !graph.contains_id(&id) {
        let mut node = Node::new(id.clone(), label, NodeKind::Module, language, "", 0);
        node.is_entry = true;
        node.is_primary_entry = !graph.nodes().any(|n| n.is_primary_entry);
        graph.add_node(node);
    }
    id
}

fn module_id_of(graph: &CodeGraph, file: &Path) -> Option<String> {
    graph
        .nodes_in_file(file)
        .find(|n| n.kind == NodeKind::Module)
        .map(|n| n.id.clone())
}
