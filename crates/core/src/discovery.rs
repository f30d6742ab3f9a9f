//! Workspace file enumeration with gitignore-aware filtering
//!
//! Uses the `ignore` crate (from ripgrep) to respect `.gitignore`,
//! `.ignore`, and `.git/info/exclude` on top of the configured exclusions
//! for vendored/build/cache directories.

use anyhow::Result;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Discover files under `root` matching any of the given `extensions`
/// (with dot), skipping paths matched by `exclude_globs`.
///
/// Returns absolute paths sorted alphabetically so downstream passes are
/// deterministic.
pub fn discover_files(
    root: &Path,
    extensions: &[&str],
    exclude_globs: &[String],
) -> Result<Vec<PathBuf>> {
    let root = root.canonicalize()?;

    let mut builder = WalkBuilder::new(&root);
    builder
        .hidden(true) // skip hidden files/dirs
        .git_ignore(true) // respect .gitignore
        .git_global(true) // respect global gitignore
        .git_exclude(true); // respect .git/info/exclude

    // Configured exclusions become negated overrides (gitignore syntax).
    if !exclude_globs.is_empty() {
        let mut overrides = OverrideBuilder::new(&root);
        for pattern in exclude_globs {
            // Directory patterns like "vendor/" become "!vendor/**"
            let glob = if pattern.ends_with('/') {
                format!("!{}**", pattern)
            } else {
                format!("!{}", pattern)
            };
            overrides.add(&glob)?;
        }
        builder.overrides(overrides.build()?);
    }

    let mut files = Vec::new();

    for entry in builder.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue, // skip unreadable entries
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.into_path();
        if has_supported_extension(&path, extensions) {
            if path.is_absolute() {
                files.push(path);
            } else {
                files.push(root.join(path));
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Turn an absolute path into the workspace-relative, `/`-separated form
/// used inside node ids. Paths outside `root` are returned unchanged.
pub fn relative_to_root(path: &Path, root: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(rel) => {
            let joined = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            PathBuf::from(joined)
        }
        Err(_) => path.to_path_buf(),
    }
}

pub(crate) fn has_supported_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e,
        None => return false,
    };
    let with_dot = format!(".{}", ext);
    extensions.contains(&with_dot.as_str())
}
