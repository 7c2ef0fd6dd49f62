//! Open file handles.
//!
//! A handle wraps exactly one sequential store stream, input or output,
//! chosen at open time from the decoded flags and the node's current state.
//! Streams only move forward; positional I/O is the dispatcher's problem to
//! reject, not ours.

use std::io::{self, Read, Write};

use tracing::{debug, warn};

use super::flags::OpenFlags;
use crate::store::{RemoteStore, StoreError, StoreReader, StoreWriter};

/// Unit of transfer between the store stream and the kernel buffer.
pub const CHUNK_SIZE: usize = 4096;

/// Symlink chains longer than this are treated as cycles.
const MAX_LINK_DEPTH: u32 = 40;

enum StreamMode {
    Reading(StoreReader),
    Writing(Box<dyn StoreWriter>),
}

pub struct OpenFile {
    path: String,
    flags: OpenFlags,
    mode: StreamMode,
}

impl OpenFile {
    /// Bind a stream for `path` according to the open flags.
    ///
    /// Writes append when the node exists and `APPEND` is set, fail
    /// `AlreadyExists` under `CREATE|EXCLUSIVE`, and otherwise replace the
    /// node. Reads on a missing node fail `NotFound` unless `CREATE` asked
    /// for the node to come into existence, in which case an output stream
    /// is bound instead. Symlinks are chased through the store's status.
    pub fn opening(
        store: &dyn RemoteStore,
        path: &str,
        flags: OpenFlags,
    ) -> Result<Self, StoreError> {
        Self::opening_at(store, path, flags, 0)
    }

    fn opening_at(
        store: &dyn RemoteStore,
        path: &str,
        flags: OpenFlags,
        depth: u32,
    ) -> Result<Self, StoreError> {
        let status = match store.status(path) {
            Ok(status) => Some(status),
            Err(StoreError::NotFound(_)) => None,
            Err(err) => return Err(err),
        };

        if let Some(status) = &status {
            if status.is_symlink() {
                if let Some(target) = &status.symlink {
                    if depth >= MAX_LINK_DEPTH {
                        return Err(StoreError::Io(io::Error::new(
                            io::ErrorKind::Other,
                            format!("too many levels of symbolic links: {path}"),
                        )));
                    }
                    debug!(path, target, "open chasing symlink");
                    return Self::opening_at(store, target, flags, depth + 1);
                }
            }
            if status.is_dir() {
                return Err(StoreError::IsDirectory(path.to_string()));
            }
        }

        let mode = if flags.contains(OpenFlags::WRITE_ONLY) {
            match &status {
                Some(_) if flags.contains(OpenFlags::APPEND) => {
                    StreamMode::Writing(store.append(path)?)
                }
                Some(_)
                    if flags.contains(OpenFlags::CREATE)
                        && flags.contains(OpenFlags::EXCLUSIVE) =>
                {
                    return Err(StoreError::AlreadyExists(path.to_string()));
                }
                _ => StreamMode::Writing(store.create(path, true)?),
            }
        } else {
            match status {
                Some(_) => {
                    if flags.is_read_write() {
                        // The store only hands out one-directional streams;
                        // a read-write open gets the read side.
                        warn!(path, "read-write open degraded to read-only");
                    }
                    StreamMode::Reading(store.open_read(path)?)
                }
                None if flags.contains(OpenFlags::CREATE) => {
                    StreamMode::Writing(store.create(path, true)?)
                }
                None => return Err(StoreError::NotFound(path.to_string())),
            }
        };

        Ok(OpenFile {
            path: path.to_string(),
            flags,
            mode,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    pub fn is_writing(&self) -> bool {
        matches!(self.mode, StreamMode::Writing(_))
    }

    /// Read up to `size` bytes from the input stream. A short result means
    /// end of stream.
    pub fn read(&mut self, size: usize) -> Result<Vec<u8>, StoreError> {
        let reader = match &mut self.mode {
            StreamMode::Reading(reader) => reader,
            StreamMode::Writing(_) => return Err(wrong_mode("reading")),
        };
        let mut out = Vec::with_capacity(size.min(CHUNK_SIZE));
        let mut chunk = [0u8; CHUNK_SIZE];
        while out.len() < size {
            let want = (size - out.len()).min(CHUNK_SIZE);
            let got = reader.read(&mut chunk[..want])?;
            if got == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..got]);
        }
        Ok(out)
    }

    /// Write the whole buffer to the output stream.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, StoreError> {
        let writer = match &mut self.mode {
            StreamMode::Reading(_) => return Err(wrong_mode("writing")),
            StreamMode::Writing(writer) => writer,
        };
        for chunk in data.chunks(CHUNK_SIZE) {
            writer.write_all(chunk)?;
        }
        Ok(data.len())
    }

    /// Make written bytes visible to new readers. No-op for input streams.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if let StreamMode::Writing(writer) = &mut self.mode {
            writer.flush_visible()?;
        }
        Ok(())
    }

    /// Request a durable sync of written bytes. No-op for input streams.
    pub fn sync(&mut self, data_only: bool) -> Result<(), StoreError> {
        if let StreamMode::Writing(writer) = &mut self.mode {
            writer.sync(data_only)?;
        }
        Ok(())
    }

    /// Finalize the stream. Output streams commit their bytes here. The
    /// handle table removes the entry first, so this runs at most once per
    /// handle.
    pub fn close(&mut self) -> Result<(), StoreError> {
        if let StreamMode::Writing(writer) = &mut self.mode {
            writer.close()?;
        }
        Ok(())
    }
}

fn wrong_mode(wanted: &str) -> StoreError {
    StoreError::Io(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("handle not open for {wanted}"),
    ))
}
