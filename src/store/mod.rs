//! Remote store boundary.
//!
//! The FUSE adapter talks to the backing store exclusively through the
//! [`RemoteStore`] trait: status-by-path, sequential read/write streams,
//! namespace mutation, lazy directory listing and extended attributes.
//! Failures are explicit [`StoreError`] kinds so the dispatcher can map them
//! to POSIX codes in a single place.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;

use bitflags::bitflags;
use thiserror::Error;

pub mod local;
pub mod mem;

pub use local::LocalStore;
pub use mem::MemStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("is a directory: {0}")]
    IsDirectory(String),
    #[error("operation not supported: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
    Symlink,
}

/// Snapshot of one remote node. Fetched fresh for every operation that needs
/// it; nothing in the adapter caches these.
#[derive(Debug, Clone)]
pub struct RemoteStatus {
    pub path: String,
    pub kind: NodeKind,
    /// Permission bits as reported by the store, if it reports any.
    pub perm: Option<u32>,
    pub len: u64,
    /// Modification time, milliseconds since the epoch.
    pub modified_ms: i64,
    /// Link target for symlinks.
    pub symlink: Option<String>,
}

impl RemoteStatus {
    /// Final path component.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == NodeKind::Symlink
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StoreCapacity {
    pub capacity: u64,
    pub remaining: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
    Execute,
}

bitflags! {
    /// setxattr create/replace policy bits, decoded from the raw syscall flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct XattrFlags: u32 {
        const CREATE = 1 << 0;
        const REPLACE = 1 << 1;
    }
}

impl XattrFlags {
    pub fn from_raw(raw: i32) -> Self {
        let mut flags = XattrFlags::empty();
        if raw & libc::XATTR_CREATE != 0 {
            flags |= XattrFlags::CREATE;
        }
        if raw & libc::XATTR_REPLACE != 0 {
            flags |= XattrFlags::REPLACE;
        }
        flags
    }
}

/// Sequential output stream bound to one remote node.
///
/// `flush_visible` makes already-written bytes visible to new readers without
/// a durability guarantee; `sync` requests a durable sync. `close` finalizes
/// the stream and must be called before the writer is dropped for the bytes
/// to be guaranteed committed.
pub trait StoreWriter: Write + Send {
    fn flush_visible(&mut self) -> io::Result<()>;
    fn sync(&mut self, data_only: bool) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()>;
}

impl fmt::Debug for dyn StoreWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreWriter")
    }
}

pub type StoreReader = Box<dyn Read + Send>;
pub type EntryIter = Box<dyn Iterator<Item = Result<RemoteStatus, StoreError>> + Send>;

/// Client contract for the backing store. Paths are store-absolute strings
/// ("/a/b"); the adapter resolves mount-relative paths before calling in.
pub trait RemoteStore: Send + Sync {
    /// Fetch the status of one node; `NotFound` if it does not exist.
    fn status(&self, path: &str) -> Result<RemoteStatus, StoreError>;

    /// Total and remaining byte capacity.
    fn capacity(&self) -> Result<StoreCapacity, StoreError>;

    /// Normalize a path through the store's own resolution (following
    /// symlinked parents where the store supports them). Fails `NotFound`
    /// for nonexistent paths.
    fn resolve(&self, path: &str) -> Result<String, StoreError>;

    /// Open a sequential input stream over a regular file.
    fn open_read(&self, path: &str) -> Result<StoreReader, StoreError>;

    /// Open a fresh output stream, creating the node. With `overwrite` unset
    /// an existing node fails `AlreadyExists`.
    fn create(&self, path: &str, overwrite: bool) -> Result<Box<dyn StoreWriter>, StoreError>;

    /// Open an output stream appending to an existing node.
    fn append(&self, path: &str) -> Result<Box<dyn StoreWriter>, StoreError>;

    fn rename(&self, from: &str, to: &str) -> Result<(), StoreError>;

    /// Delete a node; `recursive` controls whether directory subtrees are
    /// removed. Returns whether the store reports the node as deleted.
    fn delete(&self, path: &str, recursive: bool) -> Result<bool, StoreError>;

    /// Create a directory chain with the given permission bits on the leaf.
    /// Returns whether the store reports the directory as created.
    fn mkdirs(&self, path: &str, perm: u32) -> Result<bool, StoreError>;

    /// Lazy listing cursor over the children of a directory.
    fn list(&self, path: &str) -> Result<EntryIter, StoreError>;

    /// Discrete permission check for one access kind.
    fn access(&self, path: &str, kind: AccessKind) -> Result<(), StoreError>;

    fn get_xattr(&self, path: &str, name: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn set_xattr(
        &self,
        path: &str,
        name: &str,
        value: &[u8],
        flags: XattrFlags,
    ) -> Result<(), StoreError>;
    fn list_xattrs(&self, path: &str) -> Result<BTreeMap<String, Vec<u8>>, StoreError>;
}

/// Construct a store client from a URL. The bootstrap layer owns scheme
/// selection; the adapter itself only ever sees the trait object.
pub fn open_store(url: &str) -> crate::Result<Arc<dyn RemoteStore>> {
    if let Some(path) = url.strip_prefix("file://") {
        if path.is_empty() {
            return Err(crate::Error::UnsupportedStoreUrl(url.to_string()).into());
        }
        return Ok(Arc::new(LocalStore::new(path)?));
    }
    if url == "mem://" {
        return Ok(Arc::new(MemStore::new()));
    }
    Err(crate::Error::UnsupportedStoreUrl(url.to_string()).into())
}

/// Join a parent path and a child name, collapsing the root special case.
pub(crate) fn join_path(base: &str, name: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}

/// Collapse a path to canonical store-absolute form ("/a/b", or "/").
pub(crate) fn normalize_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Parent component of a store-absolute path ("/" for top-level nodes).
pub(crate) fn parent_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(pos) => &path[..pos],
    }
}
