//! Mount-relative path resolution.
//!
//! Every FUSE operation arrives with a path relative to the mountpoint. The
//! resolver anchors it under the configured root subtree and runs it through
//! the store's own resolution so symlinked parents behave the way the store
//! defines them.

use std::sync::Arc;

use crate::store::{RemoteStore, StoreError};

pub struct PathResolver {
    root: String,
    store: Arc<dyn RemoteStore>,
}

impl PathResolver {
    pub fn new(store: Arc<dyn RemoteStore>, root: impl Into<String>) -> Self {
        PathResolver {
            root: root.into(),
            store,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Resolve a mount-relative path to a store-absolute one. Fails
    /// `NotFound` when the node does not exist.
    pub fn resolve(&self, rel: &str) -> Result<String, StoreError> {
        if rel.is_empty() || rel == "/" {
            return self.store.resolve(&self.root);
        }
        let rel = rel.trim_start_matches('/');
        self.store.resolve(&join(&self.root, rel))
    }

    /// Resolve the parent of a mount-relative path, returning the resolved
    /// parent and the leaf name. The parent must exist; the leaf need not.
    pub fn resolve_parent(&self, rel: &str) -> Result<(String, String), StoreError> {
        let (parent, name) = split_parent(rel);
        let parent = self.resolve(parent)?;
        Ok((parent, name.to_string()))
    }

    /// Store-absolute target for a node that may not exist yet.
    pub fn resolve_target(&self, rel: &str) -> Result<String, StoreError> {
        let (parent, name) = self.resolve_parent(rel)?;
        Ok(join(&parent, &name))
    }
}

/// Split a mount-relative path into (parent, leaf). Paths without a slash
/// past position zero live directly under the mount root.
fn split_parent(rel: &str) -> (&str, &str) {
    match rel.rfind('/') {
        Some(pos) if pos >= 1 => (&rel[..pos], rel[pos..].trim_start_matches('/')),
        _ => ("/", rel.trim_start_matches('/')),
    }
}

fn join(base: &str, name: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}
