use remfs::fs::file::OpenFile;
use remfs::fs::flags::OpenFlags;
use remfs::store::{MemStore, StoreError};

#[test]
fn read_open_on_missing_node_fails_not_found() {
    let store = MemStore::new();
    match OpenFile::opening(&store, "/nope", OpenFlags::empty()) {
        Err(StoreError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn exclusive_create_on_existing_node_fails() {
    let store = MemStore::new();
    store.add_file("/f", b"x");
    let flags = OpenFlags::WRITE_ONLY | OpenFlags::CREATE | OpenFlags::EXCLUSIVE;
    match OpenFile::opening(&store, "/f", flags) {
        Err(StoreError::AlreadyExists(_)) => {}
        other => panic!("expected AlreadyExists, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn append_extends_existing_contents() {
    let store = MemStore::new();
    store.add_file("/f", b"abc");
    let flags = OpenFlags::WRITE_ONLY | OpenFlags::APPEND;
    let mut file = OpenFile::opening(&store, "/f", flags).unwrap();
    assert!(file.is_writing());
    file.write(b"def").unwrap();
    file.close().unwrap();

    assert_eq!(store.contents("/f").unwrap(), b"abcdef");
}

#[test]
fn plain_write_open_replaces_contents() {
    let store = MemStore::new();
    store.add_file("/f", b"old old old");
    let mut file = OpenFile::opening(&store, "/f", OpenFlags::WRITE_ONLY).unwrap();
    file.write(b"new").unwrap();
    file.close().unwrap();

    assert_eq!(store.contents("/f").unwrap(), b"new");
}

#[test]
fn read_write_open_degrades_to_reading() {
    let store = MemStore::new();
    store.add_file("/f", b"data");
    let mut file = OpenFile::opening(&store, "/f", OpenFlags::READ_WRITE).unwrap();
    assert!(!file.is_writing());
    assert_eq!(file.read(16).unwrap(), b"data");

    match file.write(b"x") {
        Err(StoreError::Io(_)) => {}
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn opening_a_directory_fails() {
    let store = MemStore::new();
    store.add_dir("/d");
    match OpenFile::opening(&store, "/d", OpenFlags::empty()) {
        Err(StoreError::IsDirectory(_)) => {}
        other => panic!("expected IsDirectory, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn symlinks_are_chased_to_their_target() {
    let store = MemStore::new();
    store.add_file("/real", b"payload");
    store.add_symlink("/link", "/real");
    let mut file = OpenFile::opening(&store, "/link", OpenFlags::empty()).unwrap();
    assert_eq!(file.read(16).unwrap(), b"payload");
}

#[test]
fn symlink_cycle_fails_instead_of_chasing_forever() {
    let store = MemStore::new();
    store.add_symlink("/a", "/b");
    store.add_symlink("/b", "/a");
    match OpenFile::opening(&store, "/a", OpenFlags::empty()) {
        Err(StoreError::Io(err)) => {
            assert!(err.to_string().contains("symbolic links"));
        }
        other => panic!("expected Io error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn reads_cross_chunk_boundaries() {
    let store = MemStore::new();
    let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    store.add_file("/big", &payload);
    let mut file = OpenFile::opening(&store, "/big", OpenFlags::empty()).unwrap();

    let first = file.read(4096).unwrap();
    assert_eq!(first, &payload[..4096]);
    let rest = file.read(100_000).unwrap();
    assert_eq!(rest, &payload[4096..]);
}

#[test]
fn short_read_at_end_of_stream() {
    let store = MemStore::new();
    store.add_file("/small", b"hello");
    let mut file = OpenFile::opening(&store, "/small", OpenFlags::empty()).unwrap();
    assert_eq!(file.read(50).unwrap(), b"hello");
    assert!(file.read(50).unwrap().is_empty());
}

#[test]
fn create_flag_on_missing_node_binds_a_writer() {
    let store = MemStore::new();
    let mut file = OpenFile::opening(&store, "/fresh", OpenFlags::CREATE).unwrap();
    assert!(file.is_writing());
    file.write(b"made").unwrap();
    file.close().unwrap();

    assert_eq!(store.contents("/fresh").unwrap(), b"made");
}

#[test]
fn fresh_handles_read_identical_bytes() {
    let store = MemStore::new();
    store.add_file("/f", b"stable contents");

    let mut first = OpenFile::opening(&store, "/f", OpenFlags::empty()).unwrap();
    let mut second = OpenFile::opening(&store, "/f", OpenFlags::empty()).unwrap();
    assert_eq!(first.read(64).unwrap(), second.read(64).unwrap());
}

#[test]
fn flush_and_sync_are_no_ops_while_reading() {
    let store = MemStore::new();
    store.add_file("/f", b"x");
    let mut file = OpenFile::opening(&store, "/f", OpenFlags::empty()).unwrap();
    file.flush().unwrap();
    file.sync(true).unwrap();
}

#[test]
fn flush_makes_written_bytes_visible_before_close() {
    let store = MemStore::new();
    let mut file = OpenFile::opening(&store, "/out", OpenFlags::WRITE_ONLY).unwrap();
    file.write(b"partial").unwrap();
    file.flush().unwrap();

    assert_eq!(store.contents("/out").unwrap(), b"partial");
    file.close().unwrap();
}
