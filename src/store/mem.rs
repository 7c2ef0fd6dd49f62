//! In-memory store used by the unit tests and `mem://` demo mounts.
//!
//! Implements the full collaborator contract including extended attributes;
//! `with_xattrs_disabled` builds a store whose attribute operations report
//! `Unsupported`, which is what drives the adapter's sticky flag.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use super::{
    join_path, normalize_path as normalize, parent_path, AccessKind, EntryIter, NodeKind,
    RemoteStatus, StoreCapacity, StoreError, StoreReader, StoreWriter, XattrFlags,
};

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    data: Vec<u8>,
    perm: Option<u32>,
    modified_ms: i64,
    xattrs: BTreeMap<String, Vec<u8>>,
    symlink: Option<String>,
}

impl Node {
    fn dir() -> Self {
        Node {
            kind: NodeKind::Directory,
            data: Vec::new(),
            perm: None,
            modified_ms: now_ms(),
            xattrs: BTreeMap::new(),
            symlink: None,
        }
    }

    fn file(data: Vec<u8>) -> Self {
        Node {
            kind: NodeKind::File,
            data,
            perm: None,
            modified_ms: now_ms(),
            xattrs: BTreeMap::new(),
            symlink: None,
        }
    }
}

struct Inner {
    nodes: Mutex<BTreeMap<String, Node>>,
    denied: Mutex<BTreeSet<String>>,
    capacity: StoreCapacity,
    xattrs_enabled: bool,
    xattr_calls: AtomicU64,
}

#[derive(Clone)]
pub struct MemStore {
    inner: Arc<Inner>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Store whose xattr operations all fail `Unsupported`.
    pub fn with_xattrs_disabled() -> Self {
        Self::build(false)
    }

    fn build(xattrs_enabled: bool) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::dir());
        MemStore {
            inner: Arc::new(Inner {
                nodes: Mutex::new(nodes),
                denied: Mutex::new(BTreeSet::new()),
                capacity: StoreCapacity {
                    capacity: 1 << 40,
                    remaining: 1 << 39,
                },
                xattrs_enabled,
                xattr_calls: AtomicU64::new(0),
            }),
        }
    }

    /// Number of remote xattr calls observed; used to assert that the sticky
    /// unsupported flag stops contacting the store.
    pub fn xattr_calls(&self) -> u64 {
        self.inner.xattr_calls.load(Ordering::SeqCst)
    }

    pub fn add_dir(&self, path: &str) {
        self.inner
            .nodes
            .lock()
            .insert(normalize(path), Node::dir());
    }

    pub fn add_file(&self, path: &str, data: &[u8]) {
        self.inner
            .nodes
            .lock()
            .insert(normalize(path), Node::file(data.to_vec()));
    }

    pub fn add_symlink(&self, path: &str, target: &str) {
        let mut node = Node::file(Vec::new());
        node.kind = NodeKind::Symlink;
        node.symlink = Some(normalize(target));
        self.inner.nodes.lock().insert(normalize(path), node);
    }

    pub fn set_perm(&self, path: &str, perm: u32) {
        if let Some(node) = self.inner.nodes.lock().get_mut(&normalize(path)) {
            node.perm = Some(perm & 0o7777);
        }
    }

    /// Make `status` on `path` fail with `AccessDenied`, simulating a store
    /// that refuses to describe the node.
    pub fn deny_status(&self, path: &str) {
        self.inner.denied.lock().insert(normalize(path));
    }

    pub fn set_xattr_direct(&self, path: &str, name: &str, value: &[u8]) {
        if let Some(node) = self.inner.nodes.lock().get_mut(&normalize(path)) {
            node.xattrs.insert(name.to_string(), value.to_vec());
        }
    }

    /// Raw contents of a file node, for test assertions.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.inner
            .nodes
            .lock()
            .get(&normalize(path))
            .map(|n| n.data.clone())
    }

    fn status_of(path: &str, node: &Node) -> RemoteStatus {
        RemoteStatus {
            path: path.to_string(),
            kind: node.kind,
            perm: node.perm,
            len: node.data.len() as u64,
            modified_ms: node.modified_ms,
            symlink: node.symlink.clone(),
        }
    }

    fn count_xattr_call(&self) -> Result<(), StoreError> {
        self.inner.xattr_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.xattrs_enabled {
            Ok(())
        } else {
            Err(StoreError::Unsupported("extended attributes".into()))
        }
    }
}

impl super::RemoteStore for MemStore {
    fn status(&self, path: &str) -> Result<RemoteStatus, StoreError> {
        let path = normalize(path);
        if self.inner.denied.lock().contains(&path) {
            return Err(StoreError::AccessDenied(path));
        }
        let nodes = self.inner.nodes.lock();
        let node = nodes
            .get(&path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        Ok(Self::status_of(&path, node))
    }

    fn capacity(&self) -> Result<StoreCapacity, StoreError> {
        Ok(self.inner.capacity)
    }

    fn resolve(&self, path: &str) -> Result<String, StoreError> {
        let path = normalize(path);
        if self.inner.nodes.lock().contains_key(&path) {
            Ok(path)
        } else {
            Err(StoreError::NotFound(path))
        }
    }

    fn open_read(&self, path: &str) -> Result<StoreReader, StoreError> {
        let path = normalize(path);
        let nodes = self.inner.nodes.lock();
        let node = nodes
            .get(&path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        match node.kind {
            NodeKind::Directory => Err(StoreError::IsDirectory(path)),
            _ => Ok(Box::new(Cursor::new(node.data.clone()))),
        }
    }

    fn create(&self, path: &str, overwrite: bool) -> Result<Box<dyn StoreWriter>, StoreError> {
        let path = normalize(path);
        let mut nodes = self.inner.nodes.lock();
        match nodes.get(&path) {
            Some(node) if node.kind == NodeKind::Directory => {
                return Err(StoreError::IsDirectory(path));
            }
            Some(_) if !overwrite => return Err(StoreError::AlreadyExists(path)),
            _ => {}
        }
        let parent = parent_path(&path).to_string();
        match nodes.get(&parent) {
            Some(node) if node.kind == NodeKind::Directory => {}
            _ => return Err(StoreError::NotFound(parent)),
        }
        nodes.insert(path.clone(), Node::file(Vec::new()));
        Ok(Box::new(MemWriter {
            inner: Arc::clone(&self.inner),
            path,
            base: Vec::new(),
            pending: Vec::new(),
        }))
    }

    fn append(&self, path: &str) -> Result<Box<dyn StoreWriter>, StoreError> {
        let path = normalize(path);
        let nodes = self.inner.nodes.lock();
        let node = nodes
            .get(&path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        if node.kind == NodeKind::Directory {
            return Err(StoreError::IsDirectory(path));
        }
        let base = node.data.clone();
        Ok(Box::new(MemWriter {
            inner: Arc::clone(&self.inner),
            path,
            base,
            pending: Vec::new(),
        }))
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), StoreError> {
        let from = normalize(from);
        let to = normalize(to);
        let mut nodes = self.inner.nodes.lock();
        if !nodes.contains_key(&from) {
            return Err(StoreError::NotFound(from));
        }
        let prefix = format!("{from}/");
        let moved: Vec<String> = nodes
            .keys()
            .filter(|k| **k == from || k.starts_with(&prefix))
            .cloned()
            .collect();
        for key in moved {
            if let Some(node) = nodes.remove(&key) {
                let suffix = &key[from.len()..];
                nodes.insert(format!("{to}{suffix}"), node);
            }
        }
        Ok(())
    }

    fn delete(&self, path: &str, recursive: bool) -> Result<bool, StoreError> {
        let path = normalize(path);
        let mut nodes = self.inner.nodes.lock();
        let node = nodes
            .get(&path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        if node.kind == NodeKind::Directory {
            let prefix = format!("{path}/");
            let has_children = nodes.keys().any(|k| k.starts_with(&prefix));
            if has_children && !recursive {
                return Err(StoreError::Io(io::Error::new(
                    io::ErrorKind::Other,
                    format!("directory not empty: {path}"),
                )));
            }
            nodes.retain(|k, _| k != &path && !k.starts_with(&prefix));
        } else {
            nodes.remove(&path);
        }
        Ok(true)
    }

    fn mkdirs(&self, path: &str, perm: u32) -> Result<bool, StoreError> {
        let path = normalize(path);
        let mut nodes = self.inner.nodes.lock();
        let mut current = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current = join_path(if current.is_empty() { "/" } else { &current }, part);
            match nodes.get(&current) {
                // A non-directory in the way means nothing was created.
                Some(node) if node.kind != NodeKind::Directory => return Ok(false),
                Some(_) => {}
                None => {
                    nodes.insert(current.clone(), Node::dir());
                }
            }
        }
        if let Some(node) = nodes.get_mut(&path) {
            node.perm = Some(perm & 0o7777);
        }
        Ok(true)
    }

    fn list(&self, path: &str) -> Result<EntryIter, StoreError> {
        let path = normalize(path);
        let nodes = self.inner.nodes.lock();
        if !nodes.contains_key(&path) {
            return Err(StoreError::NotFound(path));
        }
        // The cursor is a snapshot taken at open; entries are yielded lazily
        // and visited at most once, matching the forward-only contract.
        let children: Vec<RemoteStatus> = nodes
            .iter()
            .filter(|(k, _)| k.as_str() != "/" && parent_path(k) == path)
            .map(|(k, n)| Self::status_of(k, n))
            .collect();
        Ok(Box::new(children.into_iter().map(Ok)))
    }

    fn access(&self, path: &str, kind: AccessKind) -> Result<(), StoreError> {
        let path = normalize(path);
        let nodes = self.inner.nodes.lock();
        let node = nodes
            .get(&path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        let bit = match kind {
            AccessKind::Read => 0o400,
            AccessKind::Write => 0o200,
            AccessKind::Execute => 0o100,
        };
        match node.perm {
            Some(perm) if perm & bit == 0 => Err(StoreError::AccessDenied(path)),
            _ => Ok(()),
        }
    }

    fn get_xattr(&self, path: &str, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.count_xattr_call()?;
        let path = normalize(path);
        let nodes = self.inner.nodes.lock();
        let node = nodes
            .get(&path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        Ok(node.xattrs.get(name).cloned())
    }

    fn set_xattr(
        &self,
        path: &str,
        name: &str,
        value: &[u8],
        flags: XattrFlags,
    ) -> Result<(), StoreError> {
        self.count_xattr_call()?;
        let path = normalize(path);
        let mut nodes = self.inner.nodes.lock();
        let node = nodes
            .get_mut(&path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        let exists = node.xattrs.contains_key(name);
        if flags.contains(XattrFlags::CREATE) && exists {
            return Err(StoreError::AlreadyExists(format!("{path}#{name}")));
        }
        if flags.contains(XattrFlags::REPLACE) && !exists {
            return Err(StoreError::NotFound(format!("{path}#{name}")));
        }
        node.xattrs.insert(name.to_string(), value.to_vec());
        Ok(())
    }

    fn list_xattrs(&self, path: &str) -> Result<BTreeMap<String, Vec<u8>>, StoreError> {
        self.count_xattr_call()?;
        let path = normalize(path);
        let nodes = self.inner.nodes.lock();
        let node = nodes
            .get(&path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        Ok(node.xattrs.clone())
    }
}

struct MemWriter {
    inner: Arc<Inner>,
    path: String,
    base: Vec<u8>,
    pending: Vec<u8>,
}

impl MemWriter {
    fn commit(&mut self) -> io::Result<()> {
        let mut nodes = self.inner.nodes.lock();
        let node = nodes
            .entry(self.path.clone())
            .or_insert_with(|| Node::file(Vec::new()));
        let mut data = self.base.clone();
        data.extend_from_slice(&self.pending);
        node.data = data;
        node.modified_ms = now_ms();
        Ok(())
    }
}

impl Write for MemWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit()
    }
}

impl StoreWriter for MemWriter {
    fn flush_visible(&mut self) -> io::Result<()> {
        self.commit()
    }

    fn sync(&mut self, _data_only: bool) -> io::Result<()> {
        self.commit()
    }

    fn close(&mut self) -> io::Result<()> {
        self.commit()
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
