//! Content-hash store for change detection
//!
//! Keeps one entry per source file: content digest, mtime, size, and the
//! node ids most recently emitted from the file. Change detection is
//! two-tier: a cheap mtime+size test first, the digest only when that
//! fails. The store persists beneath the workspace and survives sessions;
//! version or algorithm mismatch resets it to empty.

use crate::artifacts::{strata_dir, write_json_atomic};
use crate::discovery::relative_to_root;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const HASH_STORE_VERSION: u32 = 1;

/// Per-file cache entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileHashEntry {
    /// Absolute path
    pub path: PathBuf,

    /// Workspace-relative path (the map key)
    pub relative_path: PathBuf,

    /// Hex digest of the raw file bytes
    pub hash: String,

    /// Last-modified time, milliseconds since the epoch
    pub mtime_ms: u64,

    /// Size in bytes
    pub size: u64,

    /// Node ids most recently emitted from this file
    #[serde(default)]
    pub node_ids: Vec<String>,
}

/// Four disjoint lists of absolute paths
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub added: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

impl ChangeSet {
    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty())
    }

    /// Number of files needing work
    pub fn changed_count(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }
}

#[derive(Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    algorithm: String,
    entries: BTreeMap<String, FileHashEntry>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheMetadata {
    version: u32,
    created_at: String,
    last_updated: String,
    workspace_root: PathBuf,
    total_files: usize,
}

/// The hash store for one workspace
pub struct FileHashStore {
    root: PathBuf,
    algorithm: String,
    created_at: Option<String>,
    entries: BTreeMap<String, FileHashEntry>,
}

impl FileHashStore {
    pub fn new(root: &Path, algorithm: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            algorithm: algorithm.to_string(),
            created_at: None,
            entries: BTreeMap::new(),
        }
    }

    fn store_path(root: &Path) -> PathBuf {
        strata_dir(root).join("cache").join("file_hashes.json")
    }

    fn metadata_path(root: &Path) -> PathBuf {
        strata_dir(root).join("cache").join("cache_metadata.json")
    }

    /// Load the persisted store. Absence, unreadable content, version
    /// mismatch, and algorithm mismatch all reset to empty.
    pub fn load(root: &Path, algorithm: &str) -> Self {
        let mut store = Self::new(root, algorithm);

        let path = Self::store_path(root);
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return store;
        };
        let Ok(file) = serde_json::from_str::<StoreFile>(&contents) else {
            tracing::warn!("hash store unreadable, resetting");
            return store;
        };
        if file.version != HASH_STORE_VERSION || file.algorithm != algorithm {
            tracing::debug!(
                version = file.version,
                algorithm = %file.algorithm,
                "hash store version/algorithm mismatch, resetting"
            );
            return store;
        }

        store.entries = file.entries;
        if let Ok(meta_contents) = std::fs::read_to_string(Self::metadata_path(root)) {
            if let Ok(meta) = serde_json::from_str::<CacheMetadata>(&meta_contents) {
                store.created_at = Some(meta.created_at);
            }
        }
        store
    }

    /// Persist atomically (write-then-rename), together with the cache
    /// metadata sidecar.
    pub fn save(&mut self) -> Result<()> {
        let file = StoreFile {
            version: HASH_STORE_VERSION,
            algorithm: self.algorithm.clone(),
            entries: self.entries.clone(),
        };
        write_json_atomic(&Self::store_path(&self.root), &file)?;

        let now = chrono::Utc::now().to_rfc3339();
        let created_at = self.created_at.get_or_insert_with(|| now.clone()).clone();
        let meta = CacheMetadata {
            version: HASH_STORE_VERSION,
            created_at,
            last_updated: now,
            workspace_root: self.root.clone(),
            total_files: self.entries.len(),
        };
        write_json_atomic(&Self::metadata_path(&self.root), &meta)?;
        Ok(())
    }

    /// Hex digest of raw file bytes
    pub fn digest_bytes(bytes: &[u8]) -> String {
        let hash = Sha256::digest(bytes);
        hash.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn digest_file(path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(Self::digest_bytes(&bytes))
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, rel: &Path) -> Option<&FileHashEntry> {
        self.entries.get(&key_of(rel))
    }

    pub fn entries(&self) -> impl Iterator<Item = &FileHashEntry> {
        self.entries.values()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Insert or refresh the entry for a file, recomputing stat and digest.
    pub fn update_entry(&mut self, abs: &Path, node_ids: Vec<String>) -> Result<()> {
        let rel = relative_to_root(abs, &self.root);
        let (mtime_ms, size) = stat_of(abs)?;
        let hash = Self::digest_file(abs)?;
        self.entries.insert(
            key_of(&rel),
            FileHashEntry {
                path: abs.to_path_buf(),
                relative_path: rel,
                hash,
                mtime_ms,
                size,
                node_ids,
            },
        );
        Ok(())
    }

    pub fn remove_entry(&mut self, abs: &Path) {
        let rel = relative_to_root(abs, &self.root);
        self.entries.remove(&key_of(&rel));
    }

    /// Replace all entries with digests restored from a branch snapshot.
    /// Stat fields are zeroed so the next detection falls through the cheap
    /// tier and compares digests against the working tree.
    pub fn restore_digests(&mut self, digests: &BTreeMap<String, String>) {
        self.entries = digests
            .iter()
            .map(|(rel, hash)| {
                let rel_path = PathBuf::from(rel);
                (
                    rel.clone(),
                    FileHashEntry {
                        path: self.root.join(&rel_path),
                        relative_path: rel_path,
                        hash: hash.clone(),
                        mtime_ms: 0,
                        size: 0,
                        node_ids: Vec::new(),
                    },
                )
            })
            .collect();
    }

    /// Relative-path → digest map, for branch snapshots.
    pub fn digest_map(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(k, e)| (k.clone(), e.hash.clone()))
            .collect()
    }

    /// Classify the current file set against the stored entries.
    pub fn detect_changes(&mut self, current_files: &[PathBuf]) -> ChangeSet {
        let mut changes = ChangeSet::default();
        let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();

        for abs in current_files {
            let rel = relative_to_root(abs, &self.root);
            let key = key_of(&rel);
            seen.insert(key.clone());

            let Some(entry) = self.entries.get_mut(&key) else {
                changes.added.push(abs.clone());
                continue;
            };

            // Tier 1: stat comparison
            let Ok((mtime_ms, size)) = stat_of(abs) else {
                // unreadable now; treat as modified so the updater rechecks
                changes.modified.push(abs.clone());
                continue;
            };
            if entry.mtime_ms == mtime_ms && entry.size == size {
                changes.unchanged.push(abs.clone());
                continue;
            }

            // Tier 2: digest comparison
            match Self::digest_file(abs) {
                Ok(hash) if hash == entry.hash => {
                    entry.mtime_ms = mtime_ms;
                    entry.size = size;
                    changes.unchanged.push(abs.clone());
                }
                Ok(_) => changes.modified.push(abs.clone()),
                Err(_) => changes.modified.push(abs.clone()),
            }
        }

        for entry in self.entries.values() {
            if !seen.contains(&key_of(&entry.relative_path)) {
                changes.deleted.push(entry.path.clone());
            }
        }

        changes.added.sort();
        changes.modified.sort();
        changes.deleted.sort();
        changes.unchanged.sort();
        changes
    }
}

fn key_of(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

fn stat_of(path: &Path) -> Result<(u64, u64)> {
    let meta = std::fs::metadata(path)?;
    let mtime_ms = meta
        .modified()?
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    Ok((mtime_ms, meta.len()))
}
