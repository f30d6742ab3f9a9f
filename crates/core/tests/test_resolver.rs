//! Import resolution against a fixed workspace file set

use std::path::{Path, PathBuf};
use strata_core::{ImportResolver, StrataConfig};

fn ws(paths: &[&str]) -> (PathBuf, Vec<PathBuf>) {
    let root = PathBuf::from("/ws");
    let files = paths.iter().map(|p| root.join(p)).collect();
    (root, files)
}

fn resolver(root: &Path, files: &[PathBuf]) -> ImportResolver {
    ImportResolver::new(root, files, &StrataConfig::default())
}

#[test]
fn test_relative_browser_import() {
    let (root, files) = ws(&["src/App.tsx", "src/Header.tsx"]);
    let r = resolver(&root, &files);

    assert_eq!(
        r.resolve(&root.join("src/App.tsx"), "./Header"),
        Some(root.join("src/Header.tsx"))
    );
    assert_eq!(r.resolve(&root.join("src/App.tsx"), "./Missing"), None);
}

#[test]
fn test_parent_relative_import() {
    let (root, files) = ws(&["src/components/Button.tsx", "src/lib/util.ts"]);
    let r = resolver(&root, &files);

    assert_eq!(
        r.resolve(&root.join("src/components/Button.tsx"), "../lib/util"),
        Some(root.join("src/lib/util.ts"))
    );
}

#[test]
fn test_folder_with_index_variant() {
    let (root, files) = ws(&["src/App.tsx", "src/components/index.ts"]);
    let r = resolver(&root, &files);

    assert_eq!(
        r.resolve(&root.join("src/App.tsx"), "./components"),
        Some(root.join("src/components/index.ts"))
    );
}

#[test]
fn test_alias_resolves_under_src() {
    let (root, files) = ws(&["src/lib/api.ts", "src/pages/Home.tsx"]);
    let r = resolver(&root, &files);

    assert_eq!(
        r.resolve(&root.join("src/pages/Home.tsx"), "@/lib/api"),
        Some(root.join("src/lib/api.ts"))
    );
}

#[test]
fn test_bare_specifier_is_external() {
    let (root, files) = ws(&["src/App.tsx"]);
    let r = resolver(&root, &files);

    assert_eq!(r.resolve(&root.join("src/App.tsx"), "react"), None);
    assert_eq!(r.resolve(&root.join("src/App.tsx"), "@scope/pkg"), None);
}

#[test]
fn test_python_relative_imports() {
    let (root, files) = ws(&["pkg/a.py", "pkg/b.py", "common.py", "pkg/sub/__init__.py"]);
    let r = resolver(&root, &files);

    assert_eq!(
        r.resolve(&root.join("pkg/a.py"), ".b"),
        Some(root.join("pkg/b.py"))
    );
    assert_eq!(
        r.resolve(&root.join("pkg/a.py"), "..common"),
        Some(root.join("common.py"))
    );
    // package import lands on __init__.py
    assert_eq!(
        r.resolve(&root.join("pkg/a.py"), ".sub"),
        Some(root.join("pkg/sub/__init__.py"))
    );
}

#[test]
fn test_python_absolute_import_from_root() {
    let (root, files) = ws(&["main.py", "routers/users.py"]);
    let r = resolver(&root, &files);

    assert_eq!(
        r.resolve(&root.join("main.py"), "routers.users"),
        Some(root.join("routers/users.py"))
    );
    assert_eq!(r.resolve(&root.join("main.py"), "os.path"), None);
}

#[test]
fn test_jvm_package_import_via_source_roots() {
    let (root, files) = ws(&[
        "src/main/java/com/example/UserService.java",
        "src/main/java/com/example/api/UserController.java",
    ]);
    let r = resolver(&root, &files);

    assert_eq!(
        r.resolve(
            &root.join("src/main/java/com/example/api/UserController.java"),
            "com.example.UserService"
        ),
        Some(root.join("src/main/java/com/example/UserService.java"))
    );
}

#[test]
fn test_jvm_stdlib_and_framework_filtered() {
    let (root, files) = ws(&["src/main/java/com/example/App.java"]);
    let r = resolver(&root, &files);
    let source = root.join("src/main/java/com/example/App.java");

    assert_eq!(r.resolve(&source, "java.util.List"), None);
    assert_eq!(r.resolve(&source, "org.springframework.stereotype.Service"), None);
    assert_eq!(r.resolve(&source, "lombok.Data"), None);
}

#[test]
fn test_jvm_filename_search_fallback() {
    // class lives outside every configured source root
    let (root, files) = ws(&["modules/billing/Invoice.java", "src/App.java"]);
    let r = resolver(&root, &files);

    assert_eq!(
        r.resolve(&root.join("src/App.java"), "com.acme.billing.Invoice"),
        Some(root.join("modules/billing/Invoice.java"))
    );
}

#[test]
fn test_wildcard_imports_resolve_to_none() {
    let (root, files) = ws(&["src/main/java/com/example/UserService.java", "src/App.java"]);
    let r = resolver(&root, &files);

    assert_eq!(r.resolve(&root.join("src/App.java"), "com.example.*"), None);
}

#[test]
fn test_escape_above_workspace_is_dropped() {
    let (root, files) = ws(&["src/App.tsx"]);
    let r = resolver(&root, &files);

    assert_eq!(
        r.resolve(&root.join("src/App.tsx"), "../../outside/Thing"),
        None
    );
}
