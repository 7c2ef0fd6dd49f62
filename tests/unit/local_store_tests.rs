use std::fs;
use std::io::{Read, Write};
use std::os::unix::fs::PermissionsExt;

use remfs::store::{LocalStore, NodeKind, RemoteStore, StoreError};
use tempfile::tempdir;

#[test]
fn status_reflects_on_disk_metadata() {
    let root = tempdir().unwrap();
    fs::create_dir(root.path().join("sub")).unwrap();
    fs::write(root.path().join("sub/file.txt"), b"hello").unwrap();

    let store = LocalStore::new(root.path()).unwrap();
    let status = store.status("/sub/file.txt").unwrap();
    assert_eq!(status.kind, NodeKind::File);
    assert_eq!(status.len, 5);
    assert_eq!(status.path, "/sub/file.txt");
    assert!(status.modified_ms > 0);

    let dir = store.status("/sub").unwrap();
    assert_eq!(dir.kind, NodeKind::Directory);
}

#[test]
fn missing_node_maps_to_not_found() {
    let root = tempdir().unwrap();
    let store = LocalStore::new(root.path()).unwrap();
    match store.status("/nope") {
        Err(StoreError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn resolve_stays_inside_the_root() {
    let root = tempdir().unwrap();
    fs::create_dir(root.path().join("sub")).unwrap();

    let store = LocalStore::new(root.path()).unwrap();
    assert_eq!(store.resolve("/").unwrap(), "/");
    assert_eq!(store.resolve("/sub").unwrap(), "/sub");
    assert!(matches!(
        store.resolve("/gone"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn create_exclusive_fails_on_existing_file() {
    let root = tempdir().unwrap();
    fs::write(root.path().join("f"), b"x").unwrap();

    let store = LocalStore::new(root.path()).unwrap();
    match store.create("/f", false) {
        Err(StoreError::AlreadyExists(_)) => {}
        other => panic!("expected AlreadyExists, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn write_append_read_round_trip() {
    let root = tempdir().unwrap();
    let store = LocalStore::new(root.path()).unwrap();

    let mut writer = store.create("/f", true).unwrap();
    writer.write_all(b"head").unwrap();
    writer.close().unwrap();

    let mut appender = store.append("/f").unwrap();
    appender.write_all(b"+tail").unwrap();
    appender.sync(true).unwrap();
    appender.close().unwrap();

    let mut reader = store.open_read("/f").unwrap();
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    assert_eq!(out, b"head+tail");
}

#[test]
fn delete_of_non_empty_directory_requires_recursive() {
    let root = tempdir().unwrap();
    fs::create_dir(root.path().join("d")).unwrap();
    fs::write(root.path().join("d/f"), b"x").unwrap();

    let store = LocalStore::new(root.path()).unwrap();
    assert!(store.delete("/d", false).is_err());
    assert!(store.delete("/d", true).unwrap());
    assert!(matches!(store.status("/d"), Err(StoreError::NotFound(_))));
}

#[test]
fn mkdirs_creates_chain_with_permissions() {
    let root = tempdir().unwrap();
    let store = LocalStore::new(root.path()).unwrap();

    assert!(store.mkdirs("/x/y", 0o700).unwrap());
    let meta = fs::metadata(root.path().join("x/y")).unwrap();
    assert_eq!(meta.permissions().mode() & 0o777, 0o700);
}

#[test]
fn list_enumerates_children_lazily() {
    let root = tempdir().unwrap();
    fs::write(root.path().join("a"), b"").unwrap();
    fs::write(root.path().join("b"), b"").unwrap();
    fs::create_dir(root.path().join("c")).unwrap();

    let store = LocalStore::new(root.path()).unwrap();
    let mut names: Vec<String> = store
        .list("/")
        .unwrap()
        .map(|entry| entry.unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn rename_moves_files() {
    let root = tempdir().unwrap();
    fs::write(root.path().join("old"), b"data").unwrap();

    let store = LocalStore::new(root.path()).unwrap();
    store.rename("/old", "/new").unwrap();
    assert_eq!(fs::read(root.path().join("new")).unwrap(), b"data");
    assert!(!root.path().join("old").exists());
}

#[test]
fn access_on_missing_node_is_not_found() {
    let root = tempdir().unwrap();
    let store = LocalStore::new(root.path()).unwrap();
    assert!(matches!(
        store.access("/gone", remfs::store::AccessKind::Read),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn extended_attributes_are_unsupported() {
    let root = tempdir().unwrap();
    let store = LocalStore::new(root.path()).unwrap();
    assert!(matches!(
        store.get_xattr("/", "user.x"),
        Err(StoreError::Unsupported(_))
    ));
    assert!(matches!(
        store.list_xattrs("/"),
        Err(StoreError::Unsupported(_))
    ));
}
