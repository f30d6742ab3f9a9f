//! Canonical serial form of the code graph
//!
//! A snapshot is what gets persisted (`graph/graph.json`, per-branch caches)
//! and what readers consume between analysis cycles. Nodes are sorted by id
//! and edges by (from, to, kind, label), so two analyses of identical
//! workspace contents serialize to byte-identical JSON.

use super::{CodeGraph, Edge, Node};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Graph-level metadata recorded with every snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphMeta {
    /// Number of distinct files that produced nodes
    pub total_files: usize,

    pub total_nodes: usize,

    /// Languages seen across the graph, sorted
    pub languages: Vec<String>,

    /// Absolute workspace root the graph was built from
    pub root_path: PathBuf,

    /// ISO-8601 timestamp of the producing analysis cycle
    pub generated_at: String,
}

/// The canonical, order-stable serial form of a [`CodeGraph`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub meta: GraphMeta,
}

impl GraphSnapshot {
    /// Capture a snapshot of the live graph.
    ///
    /// `generated_at` is supplied by the caller so that identical graph
    /// contents can be compared independent of wall-clock time.
    pub fn capture(graph: &CodeGraph, generated_at: String) -> Self {
        let mut nodes: Vec<Node> = graph.nodes().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges: Vec<Edge> = graph.edges().cloned().collect();
        edges.sort();

        let languages: Vec<String> = {
            let mut set: Vec<&'static str> =
                nodes.iter().map(|n| n.language.name()).collect();
            set.sort();
            set.dedup();
            set.into_iter().map(String::from).collect()
        };

        let meta = GraphMeta {
            total_files: graph.files().len(),
            total_nodes: nodes.len(),
            languages,
            root_path: graph.root_path().clone(),
            generated_at,
        };

        Self { nodes, edges, meta }
    }

    /// Rebuild a live graph from this snapshot.
    pub fn restore(&self) -> CodeGraph {
        let mut graph = CodeGraph::new(self.meta.root_path.clone());
        for node in &self.nodes {
            graph.add_node(node.clone());
        }
        for edge in &self.edges {
            graph.add_edge(edge.clone());
        }
        graph
    }

    /// An empty sentinel snapshot, returned when an analysis is guarded off.
    pub fn empty(root_path: PathBuf) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            meta: GraphMeta {
                total_files: 0,
                total_nodes: 0,
                languages: Vec::new(),
                root_path,
                generated_at: String::new(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}
