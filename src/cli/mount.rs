//! Implementation of `remfs mount` subcommand.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{mpsc, Arc},
    time::Duration,
};

use clap::Args;
use ctrlc;
use tracing::{info, instrument};

use crate::{
    fs::{spawn_mount, MountConfig, MountHandle},
    store::{open_store, RemoteStore},
    Error, Result,
};

#[derive(Debug, Clone, Args)]
pub struct MountArgs {
    /// Store URL, e.g. file:///srv/data or mem://
    #[arg(short = 's', long = "store")]
    pub store: Option<String>,

    /// Path to the mount target directory
    #[arg(long = "mnt-path")]
    pub mnt_path: Option<PathBuf>,

    /// Store-absolute subtree to expose as the mount root
    #[arg(long = "root", default_value = "/")]
    pub root: String,

    /// Maximum file name length reported to the kernel
    #[arg(long = "max-name-len", default_value_t = 255)]
    pub max_name_len: u32,

    /// Pass the debug mount option through to the kernel
    #[arg(long = "debug", default_value_t = false)]
    pub debug: bool,

    /// Serve the mount on the calling thread instead of a background session
    #[arg(long = "blocking", default_value_t = false)]
    pub blocking: bool,
}

pub fn execute(args: MountArgs) -> Result<()> {
    if args.blocking {
        let (store, config, mnt_path) = prepare(args)?;
        info!(mnt = %mnt_path.display(), "serving mount in the foreground");
        return crate::fs::mount_blocking(store, config, &mnt_path);
    }

    // Execute the mount and hold it until a termination signal is received.
    let (handle, mnt_path) = mount(args)?;

    info!("mount active; press Ctrl+C to unmount");

    #[derive(Debug)]
    enum Event {
        Signal,
        Unmounted,
    }

    let (tx, rx) = mpsc::channel();

    // Handle SIGINT/SIGTERM.
    ctrlc::set_handler({
        let tx = tx.clone();
        move || {
            let _ = tx.send(Event::Signal);
        }
    })
    .map_err(|e| Error::Cli(format!("failed to install signal handler: {e}")))?;

    // Watch for external unmounts.
    let watch_path = mnt_path.clone();
    std::thread::spawn(move || loop {
        std::thread::sleep(Duration::from_millis(500));
        if !is_mounted(&watch_path) {
            let _ = tx.send(Event::Unmounted);
            break;
        }
    });

    match rx.recv() {
        Ok(Event::Signal) => {
            info!("signal received; unmounting {}", mnt_path.display());
            handle.unmount();
        }
        Ok(Event::Unmounted) => {
            info!("detected external unmount; exiting for {}", mnt_path.display());
            // Join the session to ensure the background thread is cleaned up.
            handle.unmount();
        }
        Err(_) => {
            handle.unmount();
        }
    }

    Ok(())
}

/// Check if a path is currently mounted (Linux-only, /proc/mounts).
fn is_mounted(path: &Path) -> bool {
    if let Ok(contents) = fs::read_to_string("/proc/mounts") {
        let target = path.to_string_lossy();
        return contents
            .lines()
            .filter_map(|line| line.split_whitespace().nth(1))
            .any(|p| p == target);
    }
    false
}

fn prepare(args: MountArgs) -> Result<(Arc<dyn RemoteStore>, MountConfig, PathBuf)> {
    let store_url = args
        .store
        .ok_or_else(|| Error::Cli("store is required".into()))?;
    let mnt_path = args
        .mnt_path
        .ok_or_else(|| Error::Cli("mnt_path is required".into()))?;

    let store = open_store(&store_url)?;
    info!(store = %store_url, "store opened");

    let config = MountConfig {
        root: args.root,
        max_name_len: args.max_name_len,
        debug: args.debug,
    };
    Ok((store, config, mnt_path))
}

/// Perform mount orchestration used by both the CLI and tests.
#[instrument(skip(args), fields(mnt = ?args.mnt_path, store = ?args.store))]
pub fn mount(args: MountArgs) -> Result<(MountHandle, PathBuf)> {
    let (store, config, mnt_path) = prepare(args)?;
    let handle = spawn_mount(store, config, &mnt_path)?;
    info!(mnt = %mnt_path.display(), "mount ready");

    Ok((handle, mnt_path))
}
