//! Numbered handle table for open files and directory cursors.
//!
//! Handles are minted from a table-local counter, so two tables never race
//! on handle numbers even when the kernel interleaves opens. Each resource
//! sits behind its own `Arc<Mutex<_>>`; lookups clone the `Arc` out of the
//! map, so the map shard is never held across resource I/O and contention
//! stays per-entry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

pub struct HandleTable<T> {
    entries: DashMap<u64, Arc<Mutex<T>>>,
    next: AtomicU64,
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        HandleTable {
            entries: DashMap::new(),
            next: AtomicU64::new(1),
        }
    }

    /// Register a resource and return its handle.
    pub fn open(&self, resource: T) -> u64 {
        let fh = self.next.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(fh, Arc::new(Mutex::new(resource)));
        fh
    }

    /// A live handle's resource. The caller locks it outside the map.
    pub fn get(&self, fh: u64) -> Option<Arc<Mutex<T>>> {
        self.entries.get(&fh).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove a handle, returning its resource if it was live.
    pub fn close(&self, fh: u64) -> Option<Arc<Mutex<T>>> {
        self.entries.remove(&fh).map(|(_, resource)| resource)
    }

    /// Remove every handle, yielding the resources for teardown.
    pub fn drain(&self) -> Vec<(u64, Arc<Mutex<T>>)> {
        let keys: Vec<u64> = self.entries.iter().map(|e| *e.key()).collect();
        keys.into_iter()
            .filter_map(|fh| self.entries.remove(&fh))
            .collect()
    }

    pub fn contains(&self, fh: u64) -> bool {
        self.entries.contains_key(&fh)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
