use remfs::fs::dir::OpenDir;
use remfs::store::{MemStore, RemoteStore};

fn dir_over(store: &MemStore, path: &str) -> OpenDir {
    OpenDir::new(path.trim_start_matches('/'), store.list(path).unwrap())
}

fn names_and_cookies(dir: &mut OpenDir) -> Vec<(String, i64)> {
    let mut seen = Vec::new();
    dir.list(|status, cookie| {
        seen.push((status.name().to_string(), cookie));
        false
    })
    .unwrap();
    seen
}

#[test]
fn cookies_count_up_and_end_with_zero() {
    let store = MemStore::new();
    store.add_dir("/d");
    store.add_file("/d/a", b"");
    store.add_file("/d/b", b"");
    store.add_file("/d/c", b"");

    let mut dir = dir_over(&store, "/d");
    let seen = names_and_cookies(&mut dir);
    assert_eq!(
        seen,
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 0),
        ]
    );
    assert_eq!(dir.emitted(), 3);
}

#[test]
fn full_sink_stops_and_cursor_resumes() {
    let store = MemStore::new();
    store.add_dir("/d");
    store.add_file("/d/a", b"");
    store.add_file("/d/b", b"");
    store.add_file("/d/c", b"");

    let mut dir = dir_over(&store, "/d");

    let mut first_page = Vec::new();
    dir.list(|status, cookie| {
        first_page.push((status.name().to_string(), cookie));
        true
    })
    .unwrap();
    assert_eq!(first_page, vec![("a".to_string(), 1)]);

    let rest = names_and_cookies(&mut dir);
    assert_eq!(rest, vec![("b".to_string(), 2), ("c".to_string(), 0)]);
    assert!(dir.is_exhausted());
}

#[test]
fn empty_directory_emits_nothing() {
    let store = MemStore::new();
    store.add_dir("/empty");

    let mut dir = dir_over(&store, "/empty");
    assert!(dir.is_exhausted());
    assert!(names_and_cookies(&mut dir).is_empty());
    assert_eq!(dir.emitted(), 0);
}

#[test]
fn exhausted_cursor_stays_exhausted() {
    let store = MemStore::new();
    store.add_dir("/d");
    store.add_file("/d/only", b"");

    let mut dir = dir_over(&store, "/d");
    let seen = names_and_cookies(&mut dir);
    assert_eq!(seen, vec![("only".to_string(), 0)]);
    assert!(dir.is_exhausted());
    assert!(names_and_cookies(&mut dir).is_empty());
}
