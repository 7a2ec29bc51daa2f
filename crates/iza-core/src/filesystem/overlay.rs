//! Overlay mounts for layered container filesystems.
//!
//! Stacks a single writable upper layer over the read-only image rootfs,
//! giving copy-on-write semantics without duplicating the image.

use std::fs;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::mount::{mount, umount2, MntFlags, MsFlags};

use iza_common::error::{IzaError, Result};

/// Mounts an overlay inside `container_dir` with the image rootfs as the
/// single lower layer.
///
/// Creates the `upper/`, `work/`, and `merged/` siblings, then issues the
/// `mount(2)` syscall with overlay-specific options. Returns the merged
/// mountpoint.
///
/// # Errors
///
/// Returns an error if directory creation fails or if the mount syscall
/// is refused; the caller downgrades the latter to the copy strategy.
pub fn mount_overlay(lower: &Path, container_dir: &Path) -> Result<PathBuf> {
    let upper = container_dir.join("upper");
    let work = container_dir.join("work");
    let merged = container_dir.join("merged");
    for dir in [&upper, &work, &merged] {
        fs::create_dir_all(dir).map_err(|e| IzaError::Io {
            path: dir.clone(),
            source: e,
        })?;
    }

    let opts = format!(
        "lowerdir={},upperdir={},workdir={}",
        lower.display(),
        upper.display(),
        work.display()
    );
    mount(
        Some("overlay"),
        &merged,
        Some("overlay"),
        MsFlags::empty(),
        Some(opts.as_str()),
    )
    .map_err(|e| IzaError::Syscall {
        op: "overlay mount",
        reason: e.to_string(),
    })?;

    tracing::info!(merged = %merged.display(), "overlayfs mounted");
    Ok(merged)
}

/// Unmounts the overlay at `merged`, detaching lazily.
///
/// Not-mounted outcomes are ignored so that teardown stays safe after a
/// partially failed setup.
pub fn unmount_overlay(merged: &Path) {
    match umount2(merged, MntFlags::MNT_DETACH) {
        Ok(()) => tracing::info!(path = %merged.display(), "overlayfs unmounted"),
        Err(Errno::EINVAL | Errno::ENOENT) => {}
        Err(e) => {
            tracing::warn!(path = %merged.display(), error = %e, "overlay unmount failed");
        }
    }
}
