use std::sync::Arc;

use remfs::fs::path::PathResolver;
use remfs::store::{MemStore, StoreError};

fn resolver(store: &MemStore, root: &str) -> PathResolver {
    PathResolver::new(Arc::new(store.clone()), root)
}

#[test]
fn empty_and_slash_resolve_to_configured_root() {
    let store = MemStore::new();
    store.add_dir("/data");
    let resolver = resolver(&store, "/data");

    assert_eq!(resolver.resolve("").unwrap(), "/data");
    assert_eq!(resolver.resolve("/").unwrap(), "/data");
}

#[test]
fn child_resolves_under_root() {
    let store = MemStore::new();
    store.add_dir("/data");
    store.add_file("/data/a.txt", b"a");
    let resolver = resolver(&store, "/data");

    assert_eq!(resolver.resolve("/a.txt").unwrap(), "/data/a.txt");
    assert_eq!(resolver.resolve("a.txt").unwrap(), "/data/a.txt");
}

#[test]
fn missing_node_fails_not_found() {
    let store = MemStore::new();
    let resolver = resolver(&store, "/");

    match resolver.resolve("/nope") {
        Err(StoreError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn parent_of_top_level_entry_is_root() {
    let store = MemStore::new();
    let resolver = resolver(&store, "/");

    let (parent, name) = resolver.resolve_parent("/a").unwrap();
    assert_eq!(parent, "/");
    assert_eq!(name, "a");
}

#[test]
fn parent_of_nested_entry() {
    let store = MemStore::new();
    store.add_dir("/d");
    let resolver = resolver(&store, "/");

    let (parent, name) = resolver.resolve_parent("/d/x").unwrap();
    assert_eq!(parent, "/d");
    assert_eq!(name, "x");
}

#[test]
fn target_for_new_leaf_joins_resolved_parent() {
    let store = MemStore::new();
    store.add_dir("/d");
    let resolver = resolver(&store, "/");

    assert_eq!(resolver.resolve_target("/d/new").unwrap(), "/d/new");
}

#[test]
fn missing_parent_fails() {
    let store = MemStore::new();
    let resolver = resolver(&store, "/");

    assert!(resolver.resolve_parent("/gone/x").is_err());
}
