//! Import resolution: maps raw import literals to workspace files
//!
//! Resolution is performed against the enumerated workspace file set, so the
//! pass stays deterministic and never references files outside the
//! workspace. External packages resolve to `None` and are silently dropped.

use crate::config::StrataConfig;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Standard-library and framework roots that are never workspace files
const JVM_EXTERNAL_PREFIXES: &[&str] = &[
    "java.",
    "javax.",
    "jakarta.",
    "lombok.",
    "kotlin.",
    "org.springframework.",
    "org.junit.",
    "org.slf4j.",
    "org.hibernate.",
    "com.fasterxml.",
    "io.swagger.",
];

const BROWSER_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// Resolves import literals for one workspace against a fixed file set.
pub struct ImportResolver {
    root: PathBuf,
    files: HashSet<PathBuf>,
    sorted_files: Vec<PathBuf>,
    aliases: Vec<(String, String)>,
    source_roots: Vec<String>,
}

impl ImportResolver {
    pub fn new(root: &Path, files: &[PathBuf], config: &StrataConfig) -> Self {
        let mut aliases: Vec<(String, String)> = config
            .aliases
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        aliases.sort();

        let mut sorted_files = files.to_vec();
        sorted_files.sort();

        Self {
            root: root.to_path_buf(),
            files: files.iter().cloned().collect(),
            sorted_files,
            aliases,
            source_roots: config.framework_source_roots.clone(),
        }
    }

    /// Resolve `literal` as written in `source_file` (absolute path).
    /// Returns the absolute path of the target workspace file, or `None`
    /// for external/unresolvable imports.
    pub fn resolve(&self, source_file: &Path, literal: &str) -> Option<PathBuf> {
        if literal.is_empty() || literal.contains('*') {
            return None; // wildcard imports resolve to nothing
        }

        if literal.starts_with("./") || literal.starts_with("../") || literal.starts_with('/') {
            return self.resolve_relative(source_file, literal);
        }

        for (prefix, target) in &self.aliases {
            if let Some(rest) = literal.strip_prefix(prefix.as_str()) {
                let base = self.root.join(target).join(rest);
                return self.try_candidates(&base, source_file);
            }
        }

        match source_file.extension().and_then(|e| e.to_str()) {
            Some("java") => self.resolve_jvm(literal),
            Some("py") => self.resolve_python(source_file, literal),
            _ => None, // bare specifiers in browser files are packages
        }
    }

    /// `./x`, `../x`, `/x`: all resolve against the source file's directory
    fn resolve_relative(&self, source_file: &Path, literal: &str) -> Option<PathBuf> {
        let base_dir = source_file.parent()?;
        let raw = base_dir.join(literal.trim_start_matches('/'));
        let normalized = normalize(&raw);
        if !normalized.starts_with(&self.root) {
            return None; // escaped the workspace
        }
        self.try_candidates(&normalized, source_file)
    }

    /// `a.b.c.Class`: filter external roots, then map dots to separators
    /// over the configured source roots; fall back to a workspace-wide
    /// filename search.
    fn resolve_jvm(&self, literal: &str) -> Option<PathBuf> {
        if JVM_EXTERNAL_PREFIXES
            .iter()
            .any(|p| literal.starts_with(p))
        {
            return None;
        }

        let as_path = literal.replace('.', "/");
        for source_root in &self.source_roots {
            let base = if source_root.is_empty() {
                self.root.join(&as_path)
            } else {
                self.root.join(source_root).join(&as_path)
            };
            let candidate = base.with_extension("java");
            if self.files.contains(&candidate) {
                return Some(candidate);
            }
        }
        // Also try directly under the root
        let candidate = self.root.join(&as_path).with_extension("java");
        if self.files.contains(&candidate) {
            return Some(candidate);
        }

        // Filename search: first match wins (files are pre-sorted)
        let class_name = literal.rsplit('.').next()?;
        let wanted = format!("{}.java", class_name);
        self.sorted_files
            .iter()
            .find(|f| {
                f.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n == wanted)
            })
            .cloned()
    }

    /// `.models` / `..pkg.mod` resolve upward from the source directory;
    /// `pkg.mod` resolves from the workspace root.
    fn resolve_python(&self, source_file: &Path, literal: &str) -> Option<PathBuf> {
        let (mut base, rest) = if literal.starts_with('.') {
            let level = literal.chars().take_while(|&c| c == '.').count();
            let mut dir = source_file.parent()?.to_path_buf();
            for _ in 1..level {
                dir = dir.parent()?.to_path_buf();
            }
            (dir, &literal[level..])
        } else {
            (self.root.clone(), literal)
        };

        if !rest.is_empty() {
            base = base.join(rest.replace('.', "/"));
        }
        let normalized = normalize(&base);
        if !normalized.starts_with(&self.root) {
            return None;
        }
        self.try_candidates(&normalized, source_file)
    }

    /// Try the source language's canonical extensions, then
    /// folder-with-index variants; the first that exists wins.
    fn try_candidates(&self, base: &Path, source_file: &Path) -> Option<PathBuf> {
        if self.files.contains(base) {
            return Some(base.to_path_buf());
        }

        match source_file.extension().and_then(|e| e.to_str()) {
            Some("py") => {
                let direct = base.with_extension("py");
                if self.files.contains(&direct) {
                    return Some(direct);
                }
                let package = base.join("__init__.py");
                if self.files.contains(&package) {
                    return Some(package);
                }
            }
            Some("java") => {
                let direct = base.with_extension("java");
                if self.files.contains(&direct) {
                    return Some(direct);
                }
            }
            _ => {
                for ext in BROWSER_EXTENSIONS {
                    let direct = base.with_extension(ext);
                    if self.files.contains(&direct) {
                        return Some(direct);
                    }
                }
                for ext in BROWSER_EXTENSIONS {
                    let index = base.join(format!("index.{}", ext));
                    if self.files.contains(&index) {
                        return Some(index);
                    }
                }
            }
        }
        None
    }
}

/// Collapse `.` and `..` components without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
