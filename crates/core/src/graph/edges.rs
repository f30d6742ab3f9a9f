//! Edge types for the code graph

use serde::{Deserialize, Serialize};

/// A directed edge between two nodes, addressed by their stable ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    /// Id of the source node
    pub from: String,

    /// Id of the target node
    pub to: String,

    /// The kind of relationship this edge represents
    pub kind: EdgeKind,

    /// Optional label, e.g. `imports` on contains edges synthesized from
    /// the bootstrap dependency walk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            label: None,
        }
    }

    pub fn labelled(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: EdgeKind,
        label: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            label: Some(label.into()),
        }
    }
}

/// The kind of relationship an edge represents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Hierarchical backbone; forms a forest rooted at module/entry nodes
    Contains,
    /// A file-level import relationship
    Imports,
    /// A call or use relationship inside one file
    Uses,
}
