//! Local-directory store for `file://` mounts.
//!
//! Projects a directory tree on the local filesystem through the remote
//! store contract. Extended attributes are reported as unsupported, which
//! exercises the adapter's sticky fallback the same way an attribute-less
//! remote store would.

use std::collections::BTreeMap;
use std::ffi::CString;
use std::fs;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use super::{
    AccessKind, EntryIter, NodeKind, RemoteStatus, StoreCapacity, StoreError, StoreReader,
    StoreWriter, XattrFlags,
};

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// The root directory must already exist; it becomes the store's "/".
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = fs::canonicalize(root.as_ref()).map_err(|e| map_io(e, root.as_ref()))?;
        Ok(LocalStore { root })
    }

    fn full(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    fn store_path(&self, full: &Path) -> Result<String, StoreError> {
        let rel = full
            .strip_prefix(&self.root)
            .map_err(|_| StoreError::AccessDenied(full.display().to_string()))?;
        if rel.as_os_str().is_empty() {
            Ok("/".to_string())
        } else {
            Ok(format!("/{}", rel.display()))
        }
    }
}

fn map_io(err: io::Error, path: &Path) -> StoreError {
    match err.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound(path.display().to_string()),
        io::ErrorKind::PermissionDenied => StoreError::AccessDenied(path.display().to_string()),
        io::ErrorKind::AlreadyExists => StoreError::AlreadyExists(path.display().to_string()),
        _ => StoreError::Io(err),
    }
}

fn status_of(full: &Path, store_path: String) -> Result<RemoteStatus, StoreError> {
    let meta = fs::symlink_metadata(full).map_err(|e| map_io(e, full))?;
    let kind = if meta.is_dir() {
        NodeKind::Directory
    } else if meta.file_type().is_symlink() {
        NodeKind::Symlink
    } else {
        NodeKind::File
    };
    let symlink = if kind == NodeKind::Symlink {
        Some(
            fs::read_link(full)
                .map_err(|e| map_io(e, full))?
                .to_string_lossy()
                .into_owned(),
        )
    } else {
        None
    };
    let modified_ms = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    Ok(RemoteStatus {
        path: store_path,
        kind,
        perm: Some(meta.mode() & 0o7777),
        len: meta.len(),
        modified_ms,
        symlink,
    })
}

impl super::RemoteStore for LocalStore {
    fn status(&self, path: &str) -> Result<RemoteStatus, StoreError> {
        let full = self.full(path);
        status_of(&full, super::normalize_path(path))
    }

    fn capacity(&self) -> Result<StoreCapacity, StoreError> {
        let cpath = CString::new(self.root.as_os_str().as_bytes())
            .map_err(|e| StoreError::Io(io::Error::new(io::ErrorKind::InvalidInput, e)))?;
        let mut vfs: libc::statvfs = unsafe { std::mem::zeroed() };
        if unsafe { libc::statvfs(cpath.as_ptr(), &mut vfs) } != 0 {
            return Err(StoreError::Io(io::Error::last_os_error()));
        }
        let frsize = vfs.f_frsize as u64;
        Ok(StoreCapacity {
            capacity: vfs.f_blocks as u64 * frsize,
            remaining: vfs.f_bavail as u64 * frsize,
        })
    }

    fn resolve(&self, path: &str) -> Result<String, StoreError> {
        let full = self.full(path);
        let canonical = fs::canonicalize(&full).map_err(|e| map_io(e, &full))?;
        self.store_path(&canonical)
    }

    fn open_read(&self, path: &str) -> Result<StoreReader, StoreError> {
        let full = self.full(path);
        let file = fs::File::open(&full).map_err(|e| map_io(e, &full))?;
        Ok(Box::new(file))
    }

    fn create(&self, path: &str, overwrite: bool) -> Result<Box<dyn StoreWriter>, StoreError> {
        let full = self.full(path);
        let mut options = fs::OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let file = options.open(&full).map_err(|e| map_io(e, &full))?;
        Ok(Box::new(LocalWriter { file }))
    }

    fn append(&self, path: &str) -> Result<Box<dyn StoreWriter>, StoreError> {
        let full = self.full(path);
        let file = fs::OpenOptions::new()
            .append(true)
            .open(&full)
            .map_err(|e| map_io(e, &full))?;
        Ok(Box::new(LocalWriter { file }))
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), StoreError> {
        let from_full = self.full(from);
        let to_full = self.full(to);
        fs::rename(&from_full, &to_full).map_err(|e| map_io(e, &from_full))
    }

    fn delete(&self, path: &str, recursive: bool) -> Result<bool, StoreError> {
        let full = self.full(path);
        let meta = fs::symlink_metadata(&full).map_err(|e| map_io(e, &full))?;
        if meta.is_dir() {
            if recursive {
                fs::remove_dir_all(&full).map_err(|e| map_io(e, &full))?;
            } else {
                fs::remove_dir(&full).map_err(|e| map_io(e, &full))?;
            }
        } else {
            fs::remove_file(&full).map_err(|e| map_io(e, &full))?;
        }
        Ok(true)
    }

    fn mkdirs(&self, path: &str, perm: u32) -> Result<bool, StoreError> {
        let full = self.full(path);
        fs::create_dir_all(&full).map_err(|e| map_io(e, &full))?;
        fs::set_permissions(&full, fs::Permissions::from_mode(perm & 0o7777))
            .map_err(|e| map_io(e, &full))?;
        Ok(true)
    }

    fn list(&self, path: &str) -> Result<EntryIter, StoreError> {
        let full = self.full(path);
        let base = super::normalize_path(path);
        let read_dir = fs::read_dir(&full).map_err(|e| map_io(e, &full))?;
        let iter = read_dir.map(move |entry| {
            let entry = entry.map_err(StoreError::Io)?;
            let child = super::join_path(&base, &entry.file_name().to_string_lossy());
            status_of(&entry.path(), child)
        });
        Ok(Box::new(iter))
    }

    fn access(&self, path: &str, kind: AccessKind) -> Result<(), StoreError> {
        let full = self.full(path);
        let cpath = CString::new(full.as_os_str().as_bytes())
            .map_err(|e| StoreError::Io(io::Error::new(io::ErrorKind::InvalidInput, e)))?;
        let mode = match kind {
            AccessKind::Read => libc::R_OK,
            AccessKind::Write => libc::W_OK,
            AccessKind::Execute => libc::X_OK,
        };
        if unsafe { libc::access(cpath.as_ptr(), mode) } == 0 {
            return Ok(());
        }
        Err(map_io(io::Error::last_os_error(), &full))
    }

    fn get_xattr(&self, _path: &str, _name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::Unsupported("extended attributes".into()))
    }

    fn set_xattr(
        &self,
        _path: &str,
        _name: &str,
        _value: &[u8],
        _flags: XattrFlags,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unsupported("extended attributes".into()))
    }

    fn list_xattrs(&self, _path: &str) -> Result<BTreeMap<String, Vec<u8>>, StoreError> {
        Err(StoreError::Unsupported("extended attributes".into()))
    }
}

struct LocalWriter {
    file: fs::File,
}

impl Write for LocalWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl StoreWriter for LocalWriter {
    fn flush_visible(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn sync(&mut self, data_only: bool) -> io::Result<()> {
        self.file.flush()?;
        if data_only {
            self.file.sync_data()
        } else {
            self.file.sync_all()
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
