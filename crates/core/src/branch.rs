//! Branch-aware graph management
//!
//! Snapshots the graph per source-control branch, classifies head
//! movements into typed events, and selects the update strategy for each.
//! A workspace that is not a repository degrades to a no-op manager: no
//! snapshots, no SCM events, never an error.

use crate::artifacts::{sanitize_filename, strata_dir, write_json_atomic};
use crate::events::ChangeEvent;
use crate::graph::{CodeGraph, GraphSnapshot};
use crate::hash_store::FileHashStore;
use anyhow::{Context, Result};
use git2::Repository;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const BRANCH_STATE_VERSION: u32 = 1;

/// Everything recorded about a branch when switching away from it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchState {
    pub branch: String,
    pub last_commit: String,
    pub timestamp: String,

    /// Relative path → content digest at snapshot time
    pub file_hashes: BTreeMap<String, String>,

    pub node_count: usize,
    pub edge_count: usize,
    pub snapshot_path: PathBuf,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BranchStateFile {
    version: u32,
    last_updated: String,
    states: BTreeMap<String, BranchState>,
}

/// What a branch switch resolves to
#[derive(Debug)]
pub enum SwitchOutcome {
    /// A snapshot was restored; reconcile it incrementally against disk
    Restored(CodeGraph),
    /// No snapshot for the target branch; a full analysis is required
    FullRefreshRequired,
}

pub struct BranchManager {
    root: PathBuf,
    repo: Option<Repository>,
    states: BTreeMap<String, BranchState>,
    last_branch: Option<String>,
    last_commit: Option<String>,
}

impl BranchManager {
    /// Open the workspace's repository. Non-repository workspaces yield a
    /// degraded manager rather than an error.
    pub fn new(root: &Path) -> Self {
        let repo = match Repository::open(root) {
            Ok(repo) => Some(repo),
            Err(e) => {
                tracing::debug!("not a repository, branch tracking disabled: {}", e);
                None
            }
        };

        let mut manager = Self {
            root: root.to_path_buf(),
            repo,
            states: Self::load_states(root),
            last_branch: None,
            last_commit: None,
        };
        manager.last_branch = manager.current_branch();
        manager.last_commit = manager.head_commit();
        manager
    }

    pub fn is_repository(&self) -> bool {
        self.repo.is_some()
    }

    /// Short name of the currently checked-out branch
    pub fn current_branch(&self) -> Option<String> {
        let repo = self.repo.as_ref()?;
        let head = repo.head().ok()?;
        head.shorthand().map(|s| s.to_string())
    }

    /// Hash of the current head commit
    pub fn head_commit(&self) -> Option<String> {
        let repo = self.repo.as_ref()?;
        let head = repo.head().ok()?;
        head.target().map(|oid| oid.to_string())
    }

    pub fn has_snapshot(&self, branch: &str) -> bool {
        self.states
            .get(branch)
            .map(|s| s.snapshot_path.exists())
            .unwrap_or(false)
    }

    pub fn state(&self, branch: &str) -> Option<&BranchState> {
        self.states.get(branch)
    }

    // ── Event classification ─────────────────────────────────────────────

    /// Compare the repository head against the last observed state and
    /// classify the movement. Returns the events to publish.
    pub fn classify_head_change(&mut self) -> Vec<ChangeEvent> {
        if self.repo.is_none() {
            return Vec::new();
        }

        let branch = self.current_branch();
        let commit = self.head_commit();
        let mut events = Vec::new();

        if branch != self.last_branch {
            if let Some(to) = branch.clone() {
                events.push(ChangeEvent::BranchSwitch {
                    from: self.last_branch.clone(),
                    to: to.clone(),
                    has_snapshot: self.has_snapshot(&to),
                });
            }
        } else if commit != self.last_commit {
            if let Some(event) = self.classify_commit_motion(&branch, &commit) {
                events.push(event);
            }
        }

        self.last_branch = branch;
        self.last_commit = commit;
        events
    }

    /// Head moved on the same ref: a plain commit, or a multi-ref update
    /// (merge, rebase, cherry-pick) per the reflog.
    fn classify_commit_motion(
        &self,
        branch: &Option<String>,
        commit: &Option<String>,
    ) -> Option<ChangeEvent> {
        let repo = self.repo.as_ref()?;
        let commit = commit.clone()?;

        if let Ok(reflog) = repo.reflog("HEAD") {
            if let Some(entry) = reflog.get(0) {
                let message = entry.message().unwrap_or("").to_lowercase();
                if message.contains("merge") {
                    return Some(ChangeEvent::Merge);
                }
                if message.contains("rebase") {
                    return Some(ChangeEvent::Rebase);
                }
                if message.contains("cherry-pick") {
                    return Some(ChangeEvent::CherryPick);
                }
                if message.contains("stash") {
                    return Some(ChangeEvent::StashApply);
                }
            }
        }

        Some(ChangeEvent::Commit {
            branch: branch.clone().unwrap_or_else(|| "HEAD".to_string()),
            commit,
        })
    }

    // ── Per-branch snapshots ─────────────────────────────────────────────

    fn branch_cache_dir(root: &Path) -> PathBuf {
        strata_dir(root).join("branch_cache")
    }

    fn states_path(root: &Path) -> PathBuf {
        Self::branch_cache_dir(root).join("branch_states.json")
    }

    fn snapshot_path(root: &Path, branch: &str) -> PathBuf {
        Self::branch_cache_dir(root).join(format!("graph_{}.json", sanitize_filename(branch)))
    }

    fn load_states(root: &Path) -> BTreeMap<String, BranchState> {
        let Ok(contents) = std::fs::read_to_string(Self::states_path(root)) else {
            return BTreeMap::new();
        };
        match serde_json::from_str::<BranchStateFile>(&contents) {
            Ok(file) if file.version == BRANCH_STATE_VERSION => file.states,
            Ok(file) => {
                tracing::debug!(version = file.version, "branch state version mismatch, resetting");
                BTreeMap::new()
            }
            Err(e) => {
                tracing::warn!("branch state index unreadable, resetting: {}", e);
                BTreeMap::new()
            }
        }
    }

    fn persist_states(&self) -> Result<()> {
        let file = BranchStateFile {
            version: BRANCH_STATE_VERSION,
            last_updated: chrono::Utc::now().to_rfc3339(),
            states: self.states.clone(),
        };
        write_json_atomic(&Self::states_path(&self.root), &file)
    }

    /// Serialize the live graph for `branch`, recording commit and per-file
    /// digests so the snapshot can later be reconciled against disk.
    pub fn save_snapshot(
        &mut self,
        branch: &str,
        snapshot: &GraphSnapshot,
        digests: BTreeMap<String, String>,
    ) -> Result<()> {
        let path = Self::snapshot_path(&self.root, branch);
        write_json_atomic(&path, snapshot)?;

        let state = BranchState {
            branch: branch.to_string(),
            last_commit: self.head_commit().unwrap_or_default(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            file_hashes: digests,
            node_count: snapshot.nodes.len(),
            edge_count: snapshot.edges.len(),
            snapshot_path: path,
        };
        self.states.insert(branch.to_string(), state);
        self.persist_states()
    }

    pub fn load_snapshot(&self, branch: &str) -> Result<Option<GraphSnapshot>> {
        let Some(state) = self.states.get(branch) else {
            return Ok(None);
        };
        let contents = std::fs::read_to_string(&state.snapshot_path)
            .with_context(|| format!("snapshot for branch {} unreadable", branch))?;
        let snapshot: GraphSnapshot = serde_json::from_str(&contents)?;
        Ok(Some(snapshot))
    }

    /// Full switch protocol: snapshot the graph of the branch being left,
    /// then restore the target branch's snapshot (digests included) or
    /// demand a full refresh.
    pub fn switch_branch(
        &mut self,
        from: Option<&str>,
        to: &str,
        live_graph: &CodeGraph,
        hash_store: &mut FileHashStore,
    ) -> Result<SwitchOutcome> {
        if let Some(from) = from {
            let snapshot = GraphSnapshot::capture(live_graph, chrono::Utc::now().to_rfc3339());
            self.save_snapshot(from, &snapshot, hash_store.digest_map())?;
        }

        match self.load_snapshot(to)? {
            Some(snapshot) => {
                if let Some(state) = self.states.get(to) {
                    hash_store.restore_digests(&state.file_hashes);
                }
                Ok(SwitchOutcome::Restored(snapshot.restore()))
            }
            None => Ok(SwitchOutcome::FullRefreshRequired),
        }
    }

    /// Drop every snapshot and the state index.
    pub fn clear(&mut self) -> Result<()> {
        self.states.clear();
        let dir = Self::branch_cache_dir(&self.root);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}
