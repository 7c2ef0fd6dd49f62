//! Open directory cursors.
//!
//! The store hands out a forward-only listing iterator; the cursor walks it
//! across successive readdir calls and never rewinds. Cookies encode resume
//! position as emitted-count-plus-one while entries remain, and zero once
//! the cursor is exhausted.

use std::iter::Peekable;

use tracing::trace;

use crate::store::{EntryIter, RemoteStatus, StoreError};

pub struct OpenDir {
    path: String,
    entries: Peekable<EntryIter>,
    emitted: u64,
}

impl OpenDir {
    pub fn new(path: impl Into<String>, entries: EntryIter) -> Self {
        OpenDir {
            path: path.into(),
            entries: entries.peekable(),
            emitted: 0,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Emit entries into `emit` until the cursor runs dry or the sink
    /// reports a full buffer. The sink returning `true` means full; that is
    /// a normal stop, not an error, and the cursor resumes from here on the
    /// next call.
    pub fn list<F>(&mut self, mut emit: F) -> Result<(), StoreError>
    where
        F: FnMut(&RemoteStatus, i64) -> bool,
    {
        loop {
            match self.entries.next() {
                Some(Ok(status)) => {
                    let cookie = if self.entries.peek().is_some() {
                        (self.emitted + 1) as i64
                    } else {
                        0
                    };
                    self.emitted += 1;
                    trace!(path = %self.path, name = status.name(), cookie, "dir entry");
                    if emit(&status, cookie) {
                        return Ok(());
                    }
                }
                Some(Err(err)) => return Err(err),
                None => return Ok(()),
            }
        }
    }

    /// Whether the cursor has no entries left. Consumes nothing.
    pub fn is_exhausted(&mut self) -> bool {
        self.entries.peek().is_none()
    }
}
