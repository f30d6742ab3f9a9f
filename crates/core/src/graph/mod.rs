//! Code graph data structures and operations

pub mod edges;
pub mod nodes;
pub mod query;
pub mod snapshot;

pub use edges::{Edge, EdgeKind};
pub use nodes::{member_id, node_id, Language, Layer, Node, NodeAttrs, NodeKind, Param};
pub use query::GraphQuery;
pub use snapshot::{GraphMeta, GraphSnapshot};

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// The code graph: typed entities connected by contains/imports/uses edges.
///
/// Nodes are addressed by their stable string ids. The underlying storage is
/// a stable directed graph so indices survive removals during incremental
/// updates, with a side index for id lookup.
#[derive(Debug, Clone)]
pub struct CodeGraph {
    graph: StableDiGraph<Node, Edge>,

    /// node id -> index in `graph`
    by_id: HashMap<String, NodeIndex>,

    /// Root directory of the analyzed workspace
    root_path: PathBuf,
}

impl CodeGraph {
    /// Create a new empty code graph
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            graph: StableDiGraph::new(),
            by_id: HashMap::new(),
            root_path,
        }
    }

    /// Add a node to the graph. Returns false (and leaves the graph
    /// untouched) when a node with the same id already exists.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.by_id.contains_key(&node.id) {
            return false;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.by_id.insert(id, idx);
        true
    }

    /// Add an edge between two existing nodes. The edge is dropped when
    /// either endpoint is missing, and duplicate (from, to, kind, label)
    /// edges are suppressed. Returns true when the edge was inserted.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        let (Some(&from), Some(&to)) = (self.by_id.get(&edge.from), self.by_id.get(&edge.to))
        else {
            return false;
        };
        let duplicate = self
            .graph
            .edges_connecting(from, to)
            .any(|e| e.weight().kind == edge.kind && e.weight().label == edge.label);
        if duplicate {
            return false;
        }
        self.graph.add_edge(from, to, edge);
        true
    }

    /// Get a node by id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.by_id.get(id).and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Get a mutable reference to a node by id
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let idx = *self.by_id.get(id)?;
        self.graph.node_weight_mut(idx)
    }

    /// Does a node with this id exist?
    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Remove a node and all its incident edges
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let idx = self.by_id.remove(id)?;
        self.graph.remove_node(idx)
    }

    /// Remove every node produced by `file` (and all incident edges).
    /// Returns the removed node ids.
    pub fn remove_file_nodes(&mut self, file: &Path) -> Vec<String> {
        let doomed: Vec<String> = self
            .graph
            .node_weights()
            .filter(|n| n.file == file)
            .map(|n| n.id.clone())
            .collect();
        for id in &doomed {
            self.remove_node(id);
        }
        doomed
    }

    /// Iterate over all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Iterate over all edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Distinct workspace-relative files that produced nodes, sorted.
    /// Virtual nodes (empty file path) are excluded.
    pub fn files(&self) -> BTreeSet<PathBuf> {
        self.graph
            .node_weights()
            .filter(|n| !n.is_virtual())
            .map(|n| n.file.clone())
            .collect()
    }

    /// All nodes produced by one file
    pub fn nodes_in_file<'a>(&'a self, file: &'a Path) -> impl Iterator<Item = &'a Node> {
        self.graph.node_weights().filter(move |n| n.file == file)
    }

    /// Does an edge (from, to, kind) exist, ignoring labels?
    pub fn has_edge(&self, from: &str, to: &str, kind: EdgeKind) -> bool {
        let (Some(&f), Some(&t)) = (self.by_id.get(from), self.by_id.get(to)) else {
            return false;
        };
        self.graph
            .edges_connecting(f, t)
            .any(|e| e.weight().kind == kind)
    }

    /// The contains-parent of a node, if any
    pub fn contains_parent(&self, id: &str) -> Option<&Node> {
        let idx = *self.by_id.get(id)?;
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .find(|e| e.weight().kind == EdgeKind::Contains)
            .and_then(|e| self.graph.node_weight(e.source()))
    }

    /// Direct contains-children of a node
    pub fn contains_children(&self, id: &str) -> Vec<&Node> {
        let Some(&idx) = self.by_id.get(id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| e.weight().kind == EdgeKind::Contains)
            .filter_map(|e| self.graph.node_weight(e.target()))
            .collect()
    }

    /// Assign `parent_id` as the contains-parent of `child_id`: sets the
    /// back-link and inserts the contains edge (optionally labelled).
    /// No-op when either node is missing.
    pub fn set_parent(&mut self, child_id: &str, parent_id: &str, label: Option<&str>) {
        if !self.contains_id(parent_id) {
            return;
        }
        let Some(child) = self.node_mut(child_id) else {
            return;
        };
        child.parent = Some(parent_id.to_string());
        let edge = match label {
            Some(l) => Edge::labelled(parent_id, child_id, EdgeKind::Contains, l),
            None => Edge::new(parent_id, child_id, EdgeKind::Contains),
        };
        self.add_edge(edge);
    }

    /// Get the root path of the workspace
    pub fn root_path(&self) -> &PathBuf {
        &self.root_path
    }

    /// Merge another graph into this one.
    ///
    /// Ids are global (derived from file paths), so merging per-file graphs
    /// built in parallel never collides; duplicate ids are skipped. Edges
    /// whose endpoints both survive are re-added.
    pub fn merge(&mut self, other: CodeGraph) {
        let edges: Vec<Edge> = other.edges().cloned().collect();
        for idx in other.graph.node_indices().collect::<Vec<_>>() {
            if let Some(node) = other.graph.node_weight(idx) {
                self.add_node(node.clone());
            }
        }
        for edge in edges {
            self.add_edge(edge);
        }
    }

    /// Drop every node not reachable from `roots` via contains edges.
    ///
    /// Roots are the entry-file nodes plus every node without a contains
    /// parent, which keeps orphans visible while discarding anything caught
    /// in a malformed containment cycle.
    pub fn retain_reachable(&mut self, entry_roots: &[String]) {
        let mut roots: Vec<NodeIndex> = entry_roots
            .iter()
            .filter_map(|id| self.by_id.get(id).copied())
            .collect();
        for idx in self.graph.node_indices() {
            let has_contains_parent = self
                .graph
                .edges_directed(idx, Direction::Incoming)
                .any(|e| e.weight().kind == EdgeKind::Contains);
            if !has_contains_parent {
                roots.push(idx);
            }
        }

        let mut reachable: HashSet<NodeIndex> = HashSet::new();
        let mut queue: VecDeque<NodeIndex> = roots.into_iter().collect();
        while let Some(idx) = queue.pop_front() {
            if !reachable.insert(idx) {
                continue;
            }
            for e in self.graph.edges_directed(idx, Direction::Outgoing) {
                if e.weight().kind == EdgeKind::Contains && !reachable.contains(&e.target()) {
                    queue.push_back(e.target());
                }
            }
        }

        let doomed: Vec<String> = self
            .graph
            .node_indices()
            .filter(|idx| !reachable.contains(idx))
            .filter_map(|idx| self.graph.node_weight(idx).map(|n| n.id.clone()))
            .collect();
        for id in doomed {
            self.remove_node(&id);
        }
    }

    /// Get a query interface for read-only graph lookups
    pub fn query(&self) -> GraphQuery<'_> {
        GraphQuery::new(self)
    }
}
