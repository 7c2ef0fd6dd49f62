//! FUSE adapter projecting a remote hierarchical store.
//!
//! The adapter keeps no attribute cache: every operation fetches fresh
//! status from the store. Kernel inodes are minted lazily and mapped to
//! mount-relative paths; open files and directory cursors live in handle
//! tables keyed by the numbers handed back to the kernel.
//!
//! The semantic methods on [`RemoteFs`] return `Result<_, c_int>` with a
//! POSIX error code on failure; the `Filesystem` callbacks are thin shims
//! that feed those results into the reply objects.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fuser::{
    FileAttr, FileType, Filesystem, KernelConfig, ReplyAttr, ReplyCreate, ReplyData,
    ReplyDirectory, ReplyEmpty, ReplyEntry, ReplyOpen, ReplyStatfs, ReplyWrite, ReplyXattr,
    Request,
};
use libc::c_int;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::attr::{attr_from_status, BLOCK_SIZE};
use super::dir::OpenDir;
use super::file::OpenFile;
use super::flags::OpenFlags;
use super::handles::HandleTable;
use super::path::PathResolver;
use super::MountConfig;
use crate::store::{AccessKind, NodeKind, RemoteStatus, RemoteStore, StoreError};

/// Attributes are never cached by the kernel.
const ATTR_TTL: Duration = Duration::ZERO;

#[cfg(target_os = "linux")]
const ENOATTR: c_int = libc::ENODATA;
#[cfg(target_os = "macos")]
const ENOATTR: c_int = libc::ENOATTR;

const ROOT_INO: u64 = 1;

/// Filesystem-wide capacity figures for statfs.
#[derive(Debug, Clone, Copy)]
pub struct StatfsSnapshot {
    pub blocks: u64,
    pub bfree: u64,
    pub bavail: u64,
    pub bsize: u32,
    pub namelen: u32,
    pub frsize: u32,
}

/// Extended-attribute replies carry either a required size or the payload,
/// depending on the caller-provided buffer size.
#[derive(Debug)]
pub enum XattrReply {
    Size(u32),
    Data(Vec<u8>),
}

pub struct RemoteFs {
    store: Arc<dyn RemoteStore>,
    resolver: PathResolver,
    max_name_len: u32,
    paths: Mutex<HashMap<u64, String>>,  // ino -> mount-relative path
    inodes: Mutex<HashMap<String, u64>>, // mount-relative path -> ino
    next_ino: Mutex<u64>,
    files: HandleTable<OpenFile>,
    dirs: HandleTable<OpenDir>,
    // Set once a store reports attributes as unsupported; later attribute
    // calls short-circuit instead of hammering the store.
    xattrs_blocked: AtomicBool,
}

impl RemoteFs {
    pub fn new(store: Arc<dyn RemoteStore>, config: MountConfig) -> Self {
        let resolver = PathResolver::new(Arc::clone(&store), config.root);
        let mut paths = HashMap::new();
        let mut inodes = HashMap::new();
        paths.insert(ROOT_INO, String::new());
        inodes.insert(String::new(), ROOT_INO);
        RemoteFs {
            store,
            resolver,
            max_name_len: config.max_name_len,
            paths: Mutex::new(paths),
            inodes: Mutex::new(inodes),
            next_ino: Mutex::new(2),
            files: HandleTable::new(),
            dirs: HandleTable::new(),
            xattrs_blocked: AtomicBool::new(false),
        }
    }

    fn rel_for(&self, ino: u64) -> Option<String> {
        self.paths.lock().get(&ino).cloned()
    }

    fn get_or_insert_ino(&self, rel: &str) -> u64 {
        if let Some(ino) = self.inodes.lock().get(rel).copied() {
            return ino;
        }
        let mut next = self.next_ino.lock();
        let ino = *next;
        *next += 1;
        self.paths.lock().insert(ino, rel.to_string());
        self.inodes.lock().insert(rel.to_string(), ino);
        ino
    }

    fn forget_rel(&self, rel: &str) {
        if let Some(ino) = self.inodes.lock().remove(rel) {
            self.paths.lock().remove(&ino);
        }
    }

    fn remap_rel(&self, old: &str, new: &str) {
        let mut inodes = self.inodes.lock();
        if let Some(ino) = inodes.remove(old) {
            inodes.insert(new.to_string(), ino);
            self.paths.lock().insert(ino, new.to_string());
        }
    }

    fn child_rel(parent: &str, name: &str) -> String {
        if parent.is_empty() {
            name.to_string()
        } else {
            format!("{parent}/{name}")
        }
    }

    fn status_for_rel(&self, rel: &str) -> Result<RemoteStatus, c_int> {
        let resolved = self.resolver.resolve(rel).map_err(errno)?;
        self.store.status(&resolved).map_err(errno)
    }

    pub fn lookup_path(&self, parent: u64, name: &str) -> Result<FileAttr, c_int> {
        let parent_rel = self.rel_for(parent).ok_or(libc::ENOENT)?;
        let rel = Self::child_rel(&parent_rel, name);
        let status = self.status_for_rel(&rel)?;
        Ok(attr_from_status(&status, self.get_or_insert_ino(&rel)))
    }

    pub fn getattr_ino(&self, ino: u64) -> Result<FileAttr, c_int> {
        let rel = self.rel_for(ino).ok_or(libc::ENOENT)?;
        let status = self.status_for_rel(&rel)?;
        Ok(attr_from_status(&status, ino))
    }

    pub fn access_path(&self, ino: u64, mask: i32) -> Result<(), c_int> {
        let rel = self.rel_for(ino).ok_or(libc::ENOENT)?;
        let resolved = self.resolver.resolve(&rel).map_err(errno)?;
        let checks = [
            (libc::R_OK, AccessKind::Read),
            (libc::W_OK, AccessKind::Write),
            (libc::X_OK, AccessKind::Execute),
        ];
        for (bit, kind) in checks {
            if mask & bit != 0 {
                // The only operation where a store refusal surfaces as EACCES.
                self.store.access(&resolved, kind).map_err(|err| match err {
                    StoreError::NotFound(_) => libc::ENOENT,
                    StoreError::AccessDenied(_) => libc::EACCES,
                    other => errno(other),
                })?;
            }
        }
        Ok(())
    }

    pub fn statfs_info(&self) -> Result<StatfsSnapshot, c_int> {
        let capacity = self.store.capacity().map_err(errno)?;
        Ok(StatfsSnapshot {
            blocks: capacity.capacity / BLOCK_SIZE as u64,
            bfree: capacity.remaining / BLOCK_SIZE as u64,
            bavail: capacity.remaining / BLOCK_SIZE as u64,
            bsize: BLOCK_SIZE,
            namelen: self.max_name_len,
            frsize: BLOCK_SIZE,
        })
    }

    pub fn opendir_ino(&self, ino: u64) -> Result<u64, c_int> {
        let rel = self.rel_for(ino).ok_or(libc::ENOENT)?;
        let status = self.status_for_rel(&rel)?;
        if !status.is_dir() {
            return Err(libc::ENOTDIR);
        }
        let entries = self.store.list(&status.path).map_err(errno)?;
        let fh = self.dirs.open(OpenDir::new(rel, entries));
        debug!(fh, path = %status.path, "opened directory");
        Ok(fh)
    }

    /// Stream directory entries into `emit` starting from the cursor's
    /// current position. The sink returns `true` when its buffer is full.
    pub fn readdir_page<F>(&self, fh: u64, offset: i64, mut emit: F) -> Result<(), c_int>
    where
        F: FnMut(u64, i64, FileType, &str) -> bool,
    {
        if offset > i32::MAX as i64 {
            warn!(offset, "readdir offset beyond 32-bit cookie range");
            return Err(libc::EOVERFLOW);
        }
        let dir = self.dirs.get(fh).ok_or(libc::EBADF)?;
        let mut dir = dir.lock();
        let parent_rel = dir.path().to_string();
        dir.list(|status, cookie| {
            let rel = Self::child_rel(&parent_rel, status.name());
            let ino = self.get_or_insert_ino(&rel);
            let kind = match status.kind {
                NodeKind::File => FileType::RegularFile,
                NodeKind::Directory => FileType::Directory,
                NodeKind::Symlink => FileType::Symlink,
            };
            emit(ino, cookie, kind, status.name())
        })
        .map_err(errno)
    }

    pub fn releasedir_fh(&self, fh: u64) {
        debug!(fh, "closing directory handle");
        self.dirs.close(fh);
    }

    pub fn open_ino(&self, ino: u64, raw_flags: i32) -> Result<u64, c_int> {
        let rel = self.rel_for(ino).ok_or(libc::ENOENT)?;
        let resolved = self.resolver.resolve(&rel).map_err(errno)?;
        let flags = OpenFlags::decode(raw_flags);
        let file = OpenFile::opening(self.store.as_ref(), &resolved, flags).map_err(errno)?;
        Ok(self.files.open(file))
    }

    /// Create-and-open. The node may not be visible in the namespace until
    /// the write stream commits, so the attribute record is synthesized from
    /// the requested mode when the store cannot status it yet.
    pub fn create_path(
        &self,
        parent: u64,
        name: &str,
        mode: u32,
        raw_flags: i32,
    ) -> Result<(u64, FileAttr), c_int> {
        let parent_rel = self.rel_for(parent).ok_or(libc::ENOENT)?;
        let rel = Self::child_rel(&parent_rel, name);
        let target = self.resolver.resolve_target(&rel).map_err(errno)?;
        let flags = OpenFlags::decode(raw_flags);
        let file = OpenFile::opening(self.store.as_ref(), &target, flags).map_err(errno)?;
        let fh = self.files.open(file);

        let status = match self.store.status(&target) {
            Ok(status) => status,
            Err(StoreError::NotFound(_)) => RemoteStatus {
                path: target,
                kind: NodeKind::File,
                perm: Some(mode & 0o7777),
                len: 0,
                modified_ms: now_ms(),
                symlink: None,
            },
            Err(err) => {
                if let Some(file) = self.files.close(fh) {
                    let _ = file.lock().close();
                }
                return Err(errno(err));
            }
        };
        let ino = self.get_or_insert_ino(&rel);
        Ok((fh, attr_from_status(&status, ino)))
    }

    pub fn read_file(&self, fh: u64, size: u32) -> Result<Vec<u8>, c_int> {
        let file = self.files.get(fh).ok_or(libc::EBADF)?;
        let mut file = file.lock();
        file.read(size as usize).map_err(errno)
    }

    pub fn write_file(&self, fh: u64, data: &[u8]) -> Result<u32, c_int> {
        let file = self.files.get(fh).ok_or(libc::EBADF)?;
        let mut file = file.lock();
        let written = file.write(data).map_err(errno)?;
        Ok(written as u32)
    }

    pub fn flush_file(&self, fh: u64) -> Result<(), c_int> {
        let file = self.files.get(fh).ok_or(libc::EBADF)?;
        let mut file = file.lock();
        file.flush().map_err(errno)
    }

    pub fn sync_file(&self, fh: u64, datasync: bool) -> Result<(), c_int> {
        let file = self.files.get(fh).ok_or(libc::EBADF)?;
        let mut file = file.lock();
        file.sync(datasync).map_err(errno)
    }

    pub fn release_file(&self, fh: u64) -> Result<(), c_int> {
        match self.files.close(fh) {
            Some(file) => file.lock().close().map_err(errno),
            None => Ok(()),
        }
    }

    /// Link target reported as its final path component; non-symlinks yield
    /// an empty target.
    pub fn readlink_ino(&self, ino: u64) -> Result<Vec<u8>, c_int> {
        let rel = self.rel_for(ino).ok_or(libc::ENOENT)?;
        let status = self.status_for_rel(&rel)?;
        match status.symlink {
            Some(target) if status.is_symlink() => {
                let name = target.rsplit('/').next().unwrap_or(&target);
                Ok(name.as_bytes().to_vec())
            }
            _ => Ok(Vec::new()),
        }
    }

    pub fn rename_path(
        &self,
        parent: u64,
        name: &str,
        new_parent: u64,
        new_name: &str,
    ) -> Result<(), c_int> {
        let parent_rel = self.rel_for(parent).ok_or(libc::ENOENT)?;
        let new_parent_rel = self.rel_for(new_parent).ok_or(libc::ENOENT)?;
        let old_rel = Self::child_rel(&parent_rel, name);
        let new_rel = Self::child_rel(&new_parent_rel, new_name);
        let old = self.resolver.resolve(&old_rel).map_err(errno)?;
        let target = self.resolver.resolve_target(&new_rel).map_err(errno)?;
        self.store.rename(&old, &target).map_err(errno)?;
        self.remap_rel(&old_rel, &new_rel);
        Ok(())
    }

    pub fn mkdir_path(&self, parent: u64, name: &str, mode: u32) -> Result<FileAttr, c_int> {
        let parent_rel = self.rel_for(parent).ok_or(libc::ENOENT)?;
        let rel = Self::child_rel(&parent_rel, name);
        let target = self.resolver.resolve_target(&rel).map_err(errno)?;
        let created = self.store.mkdirs(&target, mode & 0o7777).map_err(errno)?;
        if !created {
            return Err(libc::EIO);
        }
        let status = self.store.status(&target).map_err(errno)?;
        Ok(attr_from_status(&status, self.get_or_insert_ino(&rel)))
    }

    pub fn rmdir_path(&self, parent: u64, name: &str) -> Result<(), c_int> {
        let parent_rel = self.rel_for(parent).ok_or(libc::ENOENT)?;
        let rel = Self::child_rel(&parent_rel, name);
        let status = self.status_for_rel(&rel)?;
        if !status.is_dir() {
            return Err(libc::ENOTDIR);
        }
        let mut children = self.store.list(&status.path).map_err(errno)?;
        if children.next().is_some() {
            return Err(libc::ENOTEMPTY);
        }
        let deleted = self.store.delete(&status.path, false).map_err(errno)?;
        if !deleted {
            return Err(libc::EIO);
        }
        self.forget_rel(&rel);
        Ok(())
    }

    pub fn unlink_path(&self, parent: u64, name: &str) -> Result<(), c_int> {
        let parent_rel = self.rel_for(parent).ok_or(libc::ENOENT)?;
        let rel = Self::child_rel(&parent_rel, name);
        let resolved = self.resolver.resolve(&rel).map_err(errno)?;
        self.store.delete(&resolved, false).map_err(errno)?;
        self.forget_rel(&rel);
        Ok(())
    }

    pub fn listxattr_path(&self, ino: u64, size: u32) -> Result<XattrReply, c_int> {
        if self.xattrs_blocked.load(Ordering::Relaxed) {
            return Err(libc::EOPNOTSUPP);
        }
        let rel = self.rel_for(ino).ok_or(libc::ENOENT)?;
        let status = self.status_for_rel(&rel)?;
        let names = match self.store.list_xattrs(&status.path) {
            Ok(map) => map,
            Err(StoreError::Unsupported(_)) => {
                self.xattrs_blocked.store(true, Ordering::Relaxed);
                return Err(libc::EOPNOTSUPP);
            }
            Err(err) => return Err(errno(err)),
        };
        let mut encoded = Vec::new();
        for name in names.keys() {
            encoded.extend_from_slice(name.as_bytes());
            encoded.push(0);
        }
        if size == 0 {
            return Ok(XattrReply::Size(encoded.len() as u32));
        }
        if encoded.len() > size as usize {
            return Err(libc::ERANGE);
        }
        Ok(XattrReply::Data(encoded))
    }

    pub fn getxattr_path(&self, ino: u64, name: &str, size: u32) -> Result<XattrReply, c_int> {
        if self.xattrs_blocked.load(Ordering::Relaxed) {
            // Quietly report no value once the store has proven it cannot
            // answer; returning an error here floods every stat-like call.
            return Ok(if size == 0 {
                XattrReply::Size(0)
            } else {
                XattrReply::Data(Vec::new())
            });
        }
        let rel = self.rel_for(ino).ok_or(libc::ENOENT)?;
        let status = self.status_for_rel(&rel)?;
        let value = match self.store.get_xattr(&status.path, name) {
            Ok(value) => value,
            Err(StoreError::Unsupported(_)) => {
                self.xattrs_blocked.store(true, Ordering::Relaxed);
                return Err(libc::EOPNOTSUPP);
            }
            Err(StoreError::AccessDenied(path)) => {
                info!(path, "attribute access denied, disabling attributes");
                self.xattrs_blocked.store(true, Ordering::Relaxed);
                return Ok(if size == 0 {
                    XattrReply::Size(0)
                } else {
                    XattrReply::Data(Vec::new())
                });
            }
            Err(err) => return Err(errno(err)),
        };
        let value = value.ok_or(ENOATTR)?;
        if size == 0 {
            return Ok(XattrReply::Size(value.len() as u32));
        }
        if value.len() > size as usize {
            return Err(libc::E2BIG);
        }
        Ok(XattrReply::Data(value))
    }

    pub fn setxattr_path(
        &self,
        ino: u64,
        name: &str,
        value: &[u8],
        raw_flags: i32,
    ) -> Result<(), c_int> {
        if self.xattrs_blocked.load(Ordering::Relaxed) {
            return Err(libc::EOPNOTSUPP);
        }
        let rel = self.rel_for(ino).ok_or(libc::ENOENT)?;
        let status = self.status_for_rel(&rel)?;
        let flags = crate::store::XattrFlags::from_raw(raw_flags);
        match self.store.set_xattr(&status.path, name, value, flags) {
            Ok(()) => Ok(()),
            Err(StoreError::Unsupported(_)) => {
                self.xattrs_blocked.store(true, Ordering::Relaxed);
                Err(libc::EOPNOTSUPP)
            }
            Err(err) => Err(errno(err)),
        }
    }

    /// Close every live handle. Output streams commit on close; failures are
    /// logged and teardown continues.
    pub fn shutdown(&self) {
        for (fh, _) in self.dirs.drain() {
            debug!(fh, "dropping directory handle");
        }
        for (fh, file) in self.files.drain() {
            let mut file = file.lock();
            let path = file.path().to_string();
            if let Err(err) = file.close() {
                warn!(fh, path, %err, "closing file handle failed");
            }
        }
    }
}

fn errno(err: StoreError) -> c_int {
    match err {
        StoreError::NotFound(_) => libc::ENOENT,
        // Refusals outside the access operation surface as generic I/O errors.
        StoreError::AccessDenied(_) => libc::EIO,
        StoreError::AlreadyExists(_) => libc::EEXIST,
        StoreError::IsDirectory(_) => libc::EISDIR,
        StoreError::Unsupported(_) => libc::EOPNOTSUPP,
        StoreError::Io(_) => libc::EIO,
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

impl Filesystem for RemoteFs {
    fn init(&mut self, _req: &Request<'_>, _config: &mut KernelConfig) -> Result<(), c_int> {
        info!(root = self.resolver.root(), "filesystem ready");
        Ok(())
    }

    fn destroy(&mut self) {
        self.shutdown();
    }

    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        match self.lookup_path(parent, &name.to_string_lossy()) {
            Ok(attr) => reply.entry(&ATTR_TTL, &attr, 0),
            Err(code) => reply.error(code),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, reply: ReplyAttr) {
        match self.getattr_ino(ino) {
            Ok(attr) => reply.attr(&ATTR_TTL, &attr),
            Err(code) => reply.error(code),
        }
    }

    fn readlink(&mut self, _req: &Request<'_>, ino: u64, reply: ReplyData) {
        match self.readlink_ino(ino) {
            Ok(target) => reply.data(&target),
            Err(code) => reply.error(code),
        }
    }

    fn mkdir(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        match self.mkdir_path(parent, &name.to_string_lossy(), mode) {
            Ok(attr) => reply.entry(&ATTR_TTL, &attr, 0),
            Err(code) => reply.error(code),
        }
    }

    fn unlink(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        match self.unlink_path(parent, &name.to_string_lossy()) {
            Ok(()) => reply.ok(),
            Err(code) => reply.error(code),
        }
    }

    fn rmdir(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        match self.rmdir_path(parent, &name.to_string_lossy()) {
            Ok(()) => reply.ok(),
            Err(code) => reply.error(code),
        }
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        newparent: u64,
        newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        match self.rename_path(
            parent,
            &name.to_string_lossy(),
            newparent,
            &newname.to_string_lossy(),
        ) {
            Ok(()) => reply.ok(),
            Err(code) => reply.error(code),
        }
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, flags: i32, reply: ReplyOpen) {
        match self.open_ino(ino, flags) {
            Ok(fh) => reply.opened(fh, 0),
            Err(code) => reply.error(code),
        }
    }

    fn create(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        flags: i32,
        reply: ReplyCreate,
    ) {
        match self.create_path(parent, &name.to_string_lossy(), mode, flags) {
            Ok((fh, attr)) => reply.created(&ATTR_TTL, &attr, 0, fh, 0),
            Err(code) => reply.error(code),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        fh: u64,
        _offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        match self.read_file(fh, size) {
            Ok(data) => reply.data(&data),
            Err(code) => reply.error(code),
        }
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        fh: u64,
        _offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        match self.write_file(fh, data) {
            Ok(written) => reply.written(written),
            Err(code) => reply.error(code),
        }
    }

    fn flush(&mut self, _req: &Request<'_>, _ino: u64, fh: u64, _lock_owner: u64, reply: ReplyEmpty) {
        match self.flush_file(fh) {
            Ok(()) => reply.ok(),
            Err(code) => reply.error(code),
        }
    }

    fn fsync(&mut self, _req: &Request<'_>, _ino: u64, fh: u64, datasync: bool, reply: ReplyEmpty) {
        match self.sync_file(fh, datasync) {
            Ok(()) => reply.ok(),
            Err(code) => reply.error(code),
        }
    }

    fn release(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        match self.release_file(fh) {
            Ok(()) => reply.ok(),
            Err(code) => reply.error(code),
        }
    }

    fn opendir(&mut self, _req: &Request<'_>, ino: u64, _flags: i32, reply: ReplyOpen) {
        match self.opendir_ino(ino) {
            Ok(fh) => reply.opened(fh, 0),
            Err(code) => reply.error(code),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let result = self.readdir_page(fh, offset, |ino, cookie, kind, name| {
            reply.add(ino, cookie, kind, name)
        });
        match result {
            Ok(()) => reply.ok(),
            Err(code) => reply.error(code),
        }
    }

    fn releasedir(&mut self, _req: &Request<'_>, _ino: u64, fh: u64, _flags: i32, reply: ReplyEmpty) {
        self.releasedir_fh(fh);
        reply.ok();
    }

    fn statfs(&mut self, _req: &Request<'_>, _ino: u64, reply: ReplyStatfs) {
        match self.statfs_info() {
            Ok(s) => reply.statfs(s.blocks, s.bfree, s.bavail, 0, 0, s.bsize, s.namelen, s.frsize),
            Err(code) => reply.error(code),
        }
    }

    fn setxattr(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        name: &OsStr,
        value: &[u8],
        flags: i32,
        _position: u32,
        reply: ReplyEmpty,
    ) {
        match self.setxattr_path(ino, &name.to_string_lossy(), value, flags) {
            Ok(()) => reply.ok(),
            Err(code) => reply.error(code),
        }
    }

    fn getxattr(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        name: &OsStr,
        size: u32,
        reply: ReplyXattr,
    ) {
        match self.getxattr_path(ino, &name.to_string_lossy(), size) {
            Ok(XattrReply::Size(len)) => reply.size(len),
            Ok(XattrReply::Data(data)) => reply.data(&data),
            Err(code) => reply.error(code),
        }
    }

    fn listxattr(&mut self, _req: &Request<'_>, ino: u64, size: u32, reply: ReplyXattr) {
        match self.listxattr_path(ino, size) {
            Ok(XattrReply::Size(len)) => reply.size(len),
            Ok(XattrReply::Data(data)) => reply.data(&data),
            Err(code) => reply.error(code),
        }
    }

    fn access(&mut self, _req: &Request<'_>, ino: u64, mask: i32, reply: ReplyEmpty) {
        match self.access_path(ino, mask) {
            Ok(()) => reply.ok(),
            Err(code) => reply.error(code),
        }
    }
}
