//! Remote status to kernel attribute translation.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fuser::{FileAttr, FileType};
use tracing::trace;

use crate::store::{NodeKind, RemoteStatus};

pub const BLOCK_SIZE: u32 = 4096;

/// Reported owner when the store has no uid/gid notion.
pub const NOBODY_UID: u32 = 65534;
pub const NOBODY_GID: u32 = 65534;

const FALLBACK_FILE_PERM: u16 = 0o640;
const FALLBACK_DIR_PERM: u16 = 0o750;

/// Translate one status snapshot into the attribute record the kernel wants.
/// Stores that report no permission bits get conservative defaults per kind.
pub fn attr_from_status(status: &RemoteStatus, ino: u64) -> FileAttr {
    let kind = match status.kind {
        NodeKind::File => FileType::RegularFile,
        NodeKind::Directory => FileType::Directory,
        NodeKind::Symlink => FileType::Symlink,
    };
    let perm = match status.perm {
        Some(p) => (p & 0o7777) as u16,
        None => match status.kind {
            NodeKind::File => FALLBACK_FILE_PERM,
            NodeKind::Directory => FALLBACK_DIR_PERM,
            NodeKind::Symlink => 0,
        },
    };
    let mtime = epoch_millis(status.modified_ms);
    trace!(path = %status.path, ?kind, perm, "attr");
    FileAttr {
        ino,
        size: status.len,
        blocks: status.len.div_ceil(512),
        atime: mtime,
        mtime,
        ctime: mtime,
        crtime: mtime,
        kind,
        perm,
        nlink: 1,
        uid: NOBODY_UID,
        gid: NOBODY_GID,
        rdev: 0,
        blksize: BLOCK_SIZE,
        flags: 0,
    }
}

fn epoch_millis(ms: i64) -> SystemTime {
    if ms >= 0 {
        UNIX_EPOCH + Duration::from_millis(ms as u64)
    } else {
        UNIX_EPOCH
    }
}
