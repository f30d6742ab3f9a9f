//! Read-only lookups over the code graph

use super::{CodeGraph, EdgeKind, Layer, Node, NodeKind};
use std::path::Path;

/// Query interface for graph lookups used by the assembler, the updater,
/// and downstream artifact writers.
pub struct GraphQuery<'a> {
    graph: &'a CodeGraph,
}

impl<'a> GraphQuery<'a> {
    pub fn new(graph: &'a CodeGraph) -> Self {
        Self { graph }
    }

    /// First node with the given label, in id order (deterministic).
    pub fn find_by_label(&self, label: &str) -> Option<&'a Node> {
        let mut hits: Vec<&Node> = self
            .graph
            .nodes()
            .filter(|n| n.label == label)
            .collect();
        hits.sort_by(|a, b| a.id.cmp(&b.id));
        hits.first().copied()
    }

    /// All nodes of a kind, in id order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<&'a Node> {
        let mut hits: Vec<&Node> = self.graph.nodes().filter(|n| n.kind == kind).collect();
        hits.sort_by(|a, b| a.id.cmp(&b.id));
        hits
    }

    /// All nodes with a layer tag, in id order.
    pub fn nodes_of_layer(&self, layer: Layer) -> Vec<&'a Node> {
        let mut hits: Vec<&Node> = self
            .graph
            .nodes()
            .filter(|n| n.layer == Some(layer))
            .collect();
        hits.sort_by(|a, b| a.id.cmp(&b.id));
        hits
    }

    /// Top-level nodes of a file: produced by it and without a parent.
    pub fn top_level_in_file(&self, file: &'a Path) -> Vec<&'a Node> {
        let mut hits: Vec<&Node> = self
            .graph
            .nodes_in_file(file)
            .filter(|n| n.parent.is_none())
            .collect();
        hits.sort_by(|a, b| a.id.cmp(&b.id));
        hits
    }

    /// The module node of a file, if the parser emitted one.
    pub fn module_of_file(&self, file: &'a Path) -> Option<&'a Node> {
        self.graph
            .nodes_in_file(file)
            .find(|n| n.kind == NodeKind::Module)
    }

    /// The single primary entry node, if one is flagged.
    pub fn primary_entry(&self) -> Option<&'a Node> {
        self.graph.nodes().find(|n| n.is_primary_entry)
    }

    /// Transitive contains-descendants of a node, in BFS order.
    pub fn descendants(&self, id: &str) -> Vec<&'a Node> {
        let mut out = Vec::new();
        let mut queue: Vec<&Node> = self.graph.contains_children(id);
        queue.sort_by(|a, b| a.id.cmp(&b.id));
        let mut queue: std::collections::VecDeque<&Node> = queue.into();
        while let Some(node) = queue.pop_front() {
            out.push(node);
            let mut children = self.graph.contains_children(&node.id);
            children.sort_by(|a, b| a.id.cmp(&b.id));
            for c in children {
                queue.push_back(c);
            }
        }
        out
    }

    /// Files this file imports, per the import edges between module nodes.
    pub fn imported_files(&self, file: &Path) -> Vec<&'a Path> {
        let Some(module) = self.module_of_file(file) else {
            return Vec::new();
        };
        let mut out: Vec<&Path> = self
            .graph
            .edges()
            .filter(|e| e.kind == EdgeKind::Imports && e.from == module.id)
            .filter_map(|e| self.graph.node(&e.to))
            .map(|n| n.file.as_path())
            .collect();
        out.sort();
        out.dedup();
        out
    }
}
