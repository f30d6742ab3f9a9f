//! Workspace enumeration: extension filters and exclusions

use std::path::Path;
use strata_core::discover_files;

fn write(root: &Path, rel: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "x\n").unwrap();
}

#[test]
fn test_extension_filter_and_sorted_output() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();

    write(&root, "b.py");
    write(&root, "a.py");
    write(&root, "readme.md");
    write(&root, "src/App.tsx");

    let files = discover_files(&root, &[".py", ".tsx"], &[]).unwrap();
    let rels: Vec<String> = files
        .iter()
        .map(|f| {
            f.strip_prefix(&root)
                .unwrap()
                .to_string_lossy()
                .to_string()
        })
        .collect();

    assert_eq!(rels, vec!["a.py", "b.py", "src/App.tsx"]);
}

#[test]
fn test_vendored_directories_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();

    write(&root, "main.py");
    write(&root, "node_modules/pkg/index.js");
    write(&root, "dist/bundle.js");
    write(&root, "src/app.js");

    let excludes = vec!["node_modules/".to_string(), "dist/".to_string()];
    let files = discover_files(&root, &[".py", ".js"], &excludes).unwrap();

    assert_eq!(files.len(), 2);
    assert!(files.iter().any(|f| f.ends_with("main.py")));
    assert!(files.iter().any(|f| f.ends_with("src/app.js")));
}

#[test]
fn test_hidden_directories_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();

    write(&root, "main.py");
    write(&root, ".strata/cache/file.py");

    let files = discover_files(&root, &[".py"], &[]).unwrap();
    assert_eq!(files.len(), 1);
}
