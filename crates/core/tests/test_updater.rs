//! Incremental update scenarios: modify, delete/re-add, seeding

use std::path::{Path, PathBuf};
use strata_core::{
    EdgeKind, GraphUpdater, Layer, StrataConfig, WorkspaceAnalyzer,
};

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
}

fn test_config() -> StrataConfig {
    let mut config = StrataConfig::default();
    config.min_analysis_interval_ms = 0;
    config
}

fn fastapi_workspace(root: &Path) {
    write(
        root,
        "main.py",
        "from fastapi import FastAPI\n\napp = FastAPI()\n",
    );
    write(
        root,
        "routers/users.py",
        "from fastapi import APIRouter\n\nrouter = APIRouter()\n\n\n@router.get(\"/\")\nasync def list_users():\n    return []\n",
    );
}

fn analyze(root: &Path) -> strata_core::CodeGraph {
    let analyzer = WorkspaceAnalyzer::new(test_config());
    let result = analyzer.analyze(root);
    assert!(!result.guarded);
    result.graph
}

#[test]
fn test_rename_within_file_counts_as_modified() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fastapi_workspace(&root);

    let mut graph = analyze(&root);
    let old_endpoint_id = graph
        .nodes()
        .find(|n| n.label == "list_users")
        .unwrap()
        .id
        .clone();

    let mut updater = GraphUpdater::new(&root, test_config());
    updater.initialize(Some(&graph));

    // rename the endpoint in place
    write(
        &root,
        "routers/users.py",
        "from fastapi import APIRouter\n\nrouter = APIRouter()\n\n\n@router.get(\"/\")\nasync def list_active_users():\n    return []\n",
    );

    let changes = updater.pending_changes(Some(&graph));
    assert_eq!(changes.modified, vec![root.join("routers/users.py")]);
    assert!(changes.added.is_empty());
    assert!(changes.deleted.is_empty());

    let report = updater.apply(&mut graph, &changes);
    assert!(report.success, "{}", report.message);
    assert_eq!(report.nodes_added, 0);
    assert_eq!(report.nodes_removed, 0);
    assert!(report.nodes_modified >= 1);

    // old id gone, new node present under the same router
    assert!(!graph.contains_id(&old_endpoint_id));
    let renamed = graph
        .nodes()
        .find(|n| n.label == "list_active_users")
        .expect("renamed endpoint");
    assert_eq!(renamed.layer, Some(Layer::Endpoint));
    assert_eq!(
        renamed.parent.as_deref(),
        Some("routers/users.py:field:router")
    );

    // untouched file keeps its nodes verbatim
    assert!(graph.contains_id("main.py:field:app"));
    assert_eq!(
        graph.node("routers/users.py:field:router").unwrap().parent.as_deref(),
        Some("main.py:field:app")
    );
}

#[test]
fn test_delete_then_readd_identical_content_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fastapi_workspace(&root);

    let mut graph = analyze(&root);
    let users_rel = PathBuf::from("routers/users.py");
    let original_ids: Vec<String> = {
        let mut ids: Vec<String> = graph
            .nodes_in_file(&users_rel)
            .map(|n| n.id.clone())
            .collect();
        ids.sort();
        ids
    };
    let original_contains: Vec<(String, String)> = {
        let mut edges: Vec<(String, String)> = graph
            .edges()
            .filter(|e| e.kind == EdgeKind::Contains)
            .map(|e| (e.from.clone(), e.to.clone()))
            .collect();
        edges.sort();
        edges
    };
    let users_content = std::fs::read_to_string(root.join("routers/users.py")).unwrap();

    let mut updater = GraphUpdater::new(&root, test_config());
    updater.initialize(Some(&graph));

    // delete
    std::fs::remove_file(root.join("routers/users.py")).unwrap();
    let changes = updater.pending_changes(Some(&graph));
    assert_eq!(changes.deleted, vec![root.join("routers/users.py")]);
    let report = updater.apply(&mut graph, &changes);
    assert!(report.success);
    assert!(report.nodes_removed >= 1);
    assert!(graph.nodes_in_file(&users_rel).next().is_none());

    // re-add with identical content
    write(&root, "routers/users.py", &users_content);
    let changes = updater.pending_changes(Some(&graph));
    assert_eq!(changes.added, vec![root.join("routers/users.py")]);
    let report = updater.apply(&mut graph, &changes);
    assert!(report.success);

    let mut restored_ids: Vec<String> = graph
        .nodes_in_file(&users_rel)
        .map(|n| n.id.clone())
        .collect();
    restored_ids.sort();
    assert_eq!(restored_ids, original_ids);

    let mut restored_contains: Vec<(String, String)> = graph
        .edges()
        .filter(|e| e.kind == EdgeKind::Contains)
        .map(|e| (e.from.clone(), e.to.clone()))
        .collect();
    restored_contains.sort();
    assert_eq!(restored_contains, original_contains);
}

#[test]
fn test_seeded_store_reports_no_false_adds() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fastapi_workspace(&root);

    let graph = analyze(&root);

    // fresh session: empty hash store seeded from the live graph
    let mut updater = GraphUpdater::new(&root, test_config());
    assert!(updater.hash_store().is_empty());
    updater.initialize(Some(&graph));

    let changes = updater.pending_changes(Some(&graph));
    assert!(changes.added.is_empty(), "seeding must prevent false adds");
    assert!(changes.modified.is_empty());
    assert!(changes.deleted.is_empty());
    assert_eq!(changes.unchanged.len(), 2);
}

#[test]
fn test_graph_files_missing_on_disk_count_as_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fastapi_workspace(&root);

    let mut graph = analyze(&root);

    // no seeding: the hash store knows nothing about these files
    let mut updater = GraphUpdater::new(&root, test_config());
    std::fs::remove_file(root.join("routers/users.py")).unwrap();

    let changes = updater.pending_changes(Some(&graph));
    assert!(changes.deleted.contains(&root.join("routers/users.py")));

    let report = updater.apply(&mut graph, &changes);
    assert!(report.success);
    assert!(graph
        .nodes_in_file(&PathBuf::from("routers/users.py"))
        .next()
        .is_none());
}

#[test]
fn test_added_file_joins_layer_chain() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write(
        &root,
        "App.java",
        "@SpringBootApplication\npublic class App {}\n",
    );

    let mut graph = analyze(&root);
    let mut updater = GraphUpdater::new(&root, test_config());
    updater.initialize(Some(&graph));

    write(
        &root,
        "OrderService.java",
        "@Service\npublic class OrderService {}\n",
    );

    let changes = updater.pending_changes(Some(&graph));
    assert_eq!(changes.added, vec![root.join("OrderService.java")]);

    let report = updater.apply(&mut graph, &changes);
    assert!(report.success);
    assert!(report.nodes_added >= 1);

    let service = graph.node("OrderService.java:class:OrderService").unwrap();
    assert_eq!(service.parent.as_deref(), Some("App.java:class:App"));
}

#[test]
fn test_force_full_refresh_clears_hash_store() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fastapi_workspace(&root);

    let graph = analyze(&root);
    let mut updater = GraphUpdater::new(&root, test_config());
    updater.initialize(Some(&graph));
    assert!(!updater.hash_store().is_empty());

    updater.force_full_refresh();
    assert!(updater.hash_store().is_empty());

    // a fresh updater sees the wiped persisted store too
    let mut fresh = GraphUpdater::new(&root, test_config());
    let changes = fresh.pending_changes(None);
    assert_eq!(changes.added.len(), 2);
    assert!(changes.unchanged.is_empty());

    // and a post-wipe analysis equals a plain analysis of the same tree
    let again = analyze(&root);
    let a = strata_core::GraphSnapshot::capture(&graph, String::new());
    let b = strata_core::GraphSnapshot::capture(&again, String::new());
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn test_apply_never_leaves_dangling_parents() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write(
        &root,
        "App.java",
        "@SpringBootApplication\npublic class App {}\n",
    );
    write(
        &root,
        "UserService.java",
        "@Service\npublic class UserService {}\n",
    );

    let mut graph = analyze(&root);
    let mut updater = GraphUpdater::new(&root, test_config());
    updater.initialize(Some(&graph));

    // removing the application file orphans the service
    std::fs::remove_file(root.join("App.java")).unwrap();
    let changes = updater.pending_changes(Some(&graph));
    let report = updater.apply(&mut graph, &changes);
    assert!(report.success);

    for node in graph.nodes() {
        if let Some(parent) = node.parent.as_deref() {
            assert!(
                graph.contains_id(parent),
                "dangling parent {} on {}",
                parent,
                node.id
            );
        }
    }
}
