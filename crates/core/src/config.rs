//! Configuration file parsing for .strata.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main configuration structure for .strata.toml
///
/// Every option has a documented default, so an absent or empty file yields
/// a fully usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrataConfig {
    /// File extensions (with dot) included in analysis
    #[serde(default = "default_include_extensions")]
    pub include_extensions: Vec<String>,

    /// Glob-style paths excluded from enumeration
    #[serde(default = "default_exclude_globs")]
    pub exclude_globs: Vec<String>,

    /// Import alias prefixes, e.g. `"@/" -> "src"`
    #[serde(default = "default_aliases")]
    pub aliases: HashMap<String, String>,

    /// Source roots tried when resolving JVM package imports
    #[serde(default = "default_framework_source_roots")]
    pub framework_source_roots: Vec<String>,

    /// Minimum spacing between consecutive full analyses
    #[serde(default = "default_min_analysis_interval_ms")]
    pub min_analysis_interval_ms: u64,

    /// Debounce window for file-system events
    #[serde(default = "default_file_watch_debounce_ms")]
    pub file_watch_debounce_ms: u64,

    /// Debounce window for source-control events
    #[serde(default = "default_scm_debounce_ms")]
    pub scm_debounce_ms: u64,

    /// Commit/file-change deltas larger than this force a full refresh
    #[serde(default = "default_full_refresh_file_threshold")]
    pub full_refresh_file_threshold: usize,

    /// Stash-apply deltas larger than this force a full refresh
    #[serde(default = "default_stash_refresh_threshold")]
    pub stash_refresh_threshold: usize,

    /// Identifier of the content digest algorithm
    #[serde(default = "default_hash_algorithm")]
    pub hash_algorithm: String,
}

fn default_include_extensions() -> Vec<String> {
    [".java", ".ts", ".tsx", ".js", ".jsx", ".py"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_exclude_globs() -> Vec<String> {
    [
        "node_modules/",
        "dist/",
        "build/",
        "target/",
        "out/",
        ".git/",
        "__pycache__/",
        ".venv/",
        "venv/",
        "site-packages/",
        ".mypy_cache/",
        ".pytest_cache/",
        ".strata/",
        "vendor/",
        "coverage/",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_aliases() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("@/".to_string(), "src".to_string());
    map
}

fn default_framework_source_roots() -> Vec<String> {
    vec![
        "src/main/java".to_string(),
        "src/main/kotlin".to_string(),
        "src".to_string(),
    ]
}

fn default_min_analysis_interval_ms() -> u64 {
    2000
}

fn default_file_watch_debounce_ms() -> u64 {
    1000
}

fn default_scm_debounce_ms() -> u64 {
    500
}

fn default_full_refresh_file_threshold() -> usize {
    50
}

fn default_stash_refresh_threshold() -> usize {
    20
}

fn default_hash_algorithm() -> String {
    "sha256".to_string()
}

impl Default for StrataConfig {
    fn default() -> Self {
        toml::from_str("").expect("empty TOML should parse to defaults")
    }
}

impl StrataConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: StrataConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Find and load .strata.toml from the given directory or its ancestors
    pub fn find_and_load(start_dir: &Path) -> Result<Self> {
        let mut current = start_dir;

        loop {
            let config_path = current.join(".strata.toml");
            if config_path.exists() {
                return Self::from_file(&config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        // No config found, use defaults
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Extensions as `&str` slices for discovery
    pub fn extensions(&self) -> Vec<&str> {
        self.include_extensions.iter().map(|s| s.as_str()).collect()
    }
}
