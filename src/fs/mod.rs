//! Filesystem layer: the FUSE adapter and its supporting pieces.
//!
//! Mount plumbing lives here; the adapter itself is in [`fuse`], with path
//! resolution, attribute translation, flag decoding, handle bookkeeping and
//! the per-handle stream and cursor types in their own modules.

use std::path::Path;
use std::sync::Arc;

use fuser::{BackgroundSession, MountOption};
use tracing::info;

use crate::store::RemoteStore;
use crate::{Error, Result};

pub mod attr;
pub mod dir;
pub mod file;
pub mod flags;
pub mod fuse;
pub mod handles;
pub mod path;

#[derive(Debug, Clone)]
pub struct MountConfig {
    /// Store-absolute subtree exposed as the mount root.
    pub root: String,
    /// Name-length limit reported by statfs.
    pub max_name_len: u32,
    /// Pass the debug option through to the kernel.
    pub debug: bool,
}

impl Default for MountConfig {
    fn default() -> Self {
        MountConfig {
            root: "/".to_string(),
            max_name_len: 255,
            debug: false,
        }
    }
}

/// Handle to a running mount; dropping it will not unmount automatically, so
/// callers should invoke `unmount` explicitly to clean up.
pub struct MountHandle {
    mountpoint: String,
    session: BackgroundSession,
}

impl std::fmt::Debug for MountHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountHandle")
            .field("mountpoint", &self.mountpoint)
            .finish()
    }
}

impl MountHandle {
    pub fn mountpoint(&self) -> &str {
        &self.mountpoint
    }

    pub fn unmount(self) {
        self.session.join();
    }
}

fn mount_options(config: &MountConfig) -> Vec<MountOption> {
    let mut options = vec![MountOption::FSName("remfs".into())];
    if config.debug {
        options.push(MountOption::CUSTOM("debug".into()));
    }
    options
}

fn validate_mountpoint(mountpoint: &Path) -> Result<()> {
    if !mountpoint.exists() || !mountpoint.is_dir() {
        return Err(Error::InvalidMountPoint(mountpoint.display().to_string()).into());
    }
    Ok(())
}

/// Spawn a background FUSE session serving `store` at `mountpoint`.
pub fn spawn_mount<P: AsRef<Path>>(
    store: Arc<dyn RemoteStore>,
    config: MountConfig,
    mountpoint: P,
) -> Result<MountHandle> {
    validate_mountpoint(mountpoint.as_ref())?;
    let mountpoint = mountpoint.as_ref().to_string_lossy().to_string();
    let options = mount_options(&config);
    let fs = fuse::RemoteFs::new(store, config);
    let session = fuser::spawn_mount2(fs, &mountpoint, &options)?;
    info!(mountpoint, "mounted");
    Ok(MountHandle {
        mountpoint,
        session,
    })
}

/// Serve the mount on the calling thread until the kernel unmounts it.
pub fn mount_blocking<P: AsRef<Path>>(
    store: Arc<dyn RemoteStore>,
    config: MountConfig,
    mountpoint: P,
) -> Result<()> {
    validate_mountpoint(mountpoint.as_ref())?;
    let options = mount_options(&config);
    let fs = fuse::RemoteFs::new(store, config);
    info!(mountpoint = %mountpoint.as_ref().display(), "mounting");
    fuser::mount2(fs, mountpoint.as_ref(), &options)?;
    Ok(())
}
