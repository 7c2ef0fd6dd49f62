use std::time::{Duration, UNIX_EPOCH};

use fuser::FileType;
use remfs::fs::attr::attr_from_status;
use remfs::fs::flags::OpenFlags;
use remfs::store::{NodeKind, RemoteStatus};

fn status(kind: NodeKind, perm: Option<u32>, len: u64, modified_ms: i64) -> RemoteStatus {
    RemoteStatus {
        path: "/x".to_string(),
        kind,
        perm,
        len,
        modified_ms,
        symlink: None,
    }
}

#[test]
fn decode_read_write_create() {
    let flags = OpenFlags::decode(libc::O_RDWR | libc::O_CREAT);
    assert!(flags.contains(OpenFlags::READ_WRITE));
    assert!(flags.contains(OpenFlags::CREATE));
    assert!(!flags.contains(OpenFlags::WRITE_ONLY));
    assert!(flags.wants_write());
    assert!(flags.is_read_write());
}

#[test]
fn decode_write_only_append() {
    let flags = OpenFlags::decode(libc::O_WRONLY | libc::O_APPEND);
    assert!(flags.contains(OpenFlags::WRITE_ONLY));
    assert!(flags.contains(OpenFlags::APPEND));
    assert!(flags.wants_write());
    assert!(!flags.is_read_write());
}

#[test]
fn decode_drops_unhandled_bits() {
    let flags = OpenFlags::decode(libc::O_RDONLY | libc::O_NOATIME | libc::O_DIRECT);
    assert_eq!(flags, OpenFlags::empty());
}

#[test]
fn decode_excl_and_trunc() {
    let flags = OpenFlags::decode(libc::O_WRONLY | libc::O_CREAT | libc::O_EXCL | libc::O_TRUNC);
    assert!(flags.contains(OpenFlags::EXCLUSIVE));
    assert!(flags.contains(OpenFlags::TRUNCATE));
}

#[test]
fn file_without_permissions_gets_fallback_mode() {
    let attr = attr_from_status(&status(NodeKind::File, None, 12, 0), 7);
    assert_eq!(attr.kind, FileType::RegularFile);
    assert_eq!(attr.perm, 0o640);
    assert_eq!(attr.ino, 7);
    assert_eq!(attr.size, 12);
}

#[test]
fn directory_without_permissions_gets_fallback_mode() {
    let attr = attr_from_status(&status(NodeKind::Directory, None, 0, 0), 2);
    assert_eq!(attr.kind, FileType::Directory);
    assert_eq!(attr.perm, 0o750);
}

#[test]
fn explicit_permissions_survive() {
    let attr = attr_from_status(&status(NodeKind::File, Some(0o644), 0, 0), 3);
    assert_eq!(attr.perm, 0o644);
}

#[test]
fn permission_bits_masked_to_mode_range() {
    let attr = attr_from_status(&status(NodeKind::File, Some(0o107644), 0, 0), 3);
    assert_eq!(attr.perm, 0o7644);
}

#[test]
fn modification_time_fills_all_time_fields() {
    let attr = attr_from_status(&status(NodeKind::File, None, 0, 1500), 4);
    let expected = UNIX_EPOCH + Duration::from_millis(1500);
    assert_eq!(attr.mtime, expected);
    assert_eq!(attr.atime, expected);
    assert_eq!(attr.ctime, expected);
    assert_eq!(attr.crtime, expected);
}

#[test]
fn sizes_and_owner_defaults() {
    let attr = attr_from_status(&status(NodeKind::File, None, 1025, 0), 5);
    assert_eq!(attr.blocks, 3);
    assert_eq!(attr.blksize, 4096);
    assert_eq!(attr.nlink, 1);
    assert_eq!(attr.uid, 65534);
    assert_eq!(attr.gid, 65534);
}

#[test]
fn symlink_kind_and_zero_mode() {
    let mut s = status(NodeKind::Symlink, None, 0, 0);
    s.symlink = Some("/real".to_string());
    let attr = attr_from_status(&s, 6);
    assert_eq!(attr.kind, FileType::Symlink);
    assert_eq!(attr.perm, 0);
}
