//! Persisted graph artifacts under `<root>/.strata/`
//!
//! Downstream readers (UI panel, data server) consume these files; the core
//! only ever writes them. All writes are durable write-then-rename, and JSON
//! output is canonical: node/edge order is fixed by the snapshot and map
//! keys are sorted.

use crate::graph::GraphSnapshot;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Cache directory beneath the workspace root
pub const STRATA_DIR: &str = ".strata";

pub fn strata_dir(root: &Path) -> PathBuf {
    root.join(STRATA_DIR)
}

pub fn graph_path(root: &Path) -> PathBuf {
    strata_dir(root).join("graph").join("graph.json")
}

pub fn nodes_dir(root: &Path) -> PathBuf {
    strata_dir(root).join("nodes")
}

pub fn metadata_path(root: &Path) -> PathBuf {
    strata_dir(root).join("metadata.json")
}

pub fn search_path(root: &Path) -> PathBuf {
    strata_dir(root).join("search.json")
}

pub fn docs_path(root: &Path) -> PathBuf {
    strata_dir(root).join("docs.json")
}

/// Current time as the ISO-8601 stamp used across artifacts
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Replace filesystem-hostile characters with `_`
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect()
}

/// Durable write: serialize to a sibling temp file, then rename over the
/// destination.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = path
        .parent()
        .context("artifact path has no parent directory")?;
    std::fs::create_dir_all(parent)?;

    let tmp = path.with_extension("json.tmp");
    let contents = serde_json::to_string_pretty(value)?;
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Project-level metadata for downstream readers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub project_name: String,
    pub generated_at: String,
    pub total_nodes: usize,
    pub total_edges: usize,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry_points: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub technologies: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
}

/// One row of the flat search index
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub file: String,
    pub line: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_entry: bool,
}

/// Documentation payload per node id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_details: Option<String>,
}

/// Write the full artifact set for one snapshot.
pub fn persist(root: &Path, snapshot: &GraphSnapshot) -> Result<()> {
    write_json_atomic(&graph_path(root), snapshot)?;

    // Per-node detail files; stale files from removed nodes go with the dir
    let nodes_dir = nodes_dir(root);
    if nodes_dir.exists() {
        std::fs::remove_dir_all(&nodes_dir)?;
    }
    std::fs::create_dir_all(&nodes_dir)?;
    for node in &snapshot.nodes {
        let file = nodes_dir.join(format!("{}.json", sanitize_filename(&node.id)));
        write_json_atomic(&file, node)?;
    }

    // Project metadata
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "workspace".to_string());
    let entry_points: Vec<String> = {
        let mut files: Vec<String> = snapshot
            .nodes
            .iter()
            .filter(|n| n.is_entry && !n.is_virtual())
            .map(|n| n.file.to_string_lossy().to_string())
            .collect();
        files.sort();
        files.dedup();
        files
    };
    let patterns: Vec<String> = {
        let mut layers: Vec<String> = snapshot
            .nodes
            .iter()
            .filter_map(|n| n.layer)
            .map(|l| l.as_str().to_string())
            .collect();
        layers.sort();
        layers.dedup();
        layers
    };
    let metadata = ProjectMetadata {
        project_name,
        generated_at: snapshot.meta.generated_at.clone(),
        total_nodes: snapshot.nodes.len(),
        total_edges: snapshot.edges.len(),
        entry_points,
        technologies: snapshot.meta.languages.clone(),
        patterns,
    };
    write_json_atomic(&metadata_path(root), &metadata)?;

    // Flat search index
    let search: Vec<SearchEntry> = snapshot
        .nodes
        .iter()
        .map(|n| SearchEntry {
            id: n.id.clone(),
            name: n.label.clone(),
            kind: n.kind.id_segment().to_string(),
            file: n.file.to_string_lossy().to_string(),
            line: n.line,
            layer: n.layer.map(|l| l.as_str().to_string()),
            is_entry: n.is_entry,
        })
        .collect();
    write_json_atomic(&search_path(root), &search)?;

    // Docs: seeded from docstrings and synthesized descriptions
    let docs: BTreeMap<String, DocEntry> = snapshot
        .nodes
        .iter()
        .filter_map(|n| {
            let summary = n
                .attrs
                .docstring
                .as_deref()
                .and_then(|d| d.lines().next())
                .map(|s| s.trim().to_string());
            let entry = DocEntry {
                ai_summary: summary,
                ai_description: n.attrs.description.clone(),
                technical_details: n.attrs.docstring.clone(),
            };
            if entry.ai_summary.is_none()
                && entry.ai_description.is_none()
                && entry.technical_details.is_none()
            {
                None
            } else {
                Some((n.id.clone(), entry))
            }
        })
        .collect();
    write_json_atomic(&docs_path(root), &docs)?;

    Ok(())
}
