//! Per-container layered root filesystems.
//!
//! A container root is a mutable view over an immutable image `rootfs/`.
//! The preferred strategy is an overlay mount; hosts without overlay
//! support (or where the mount syscall is refused) fall back to a
//! recursive copy.

pub mod copy;
pub mod overlay;

use std::fs;
use std::path::{Path, PathBuf};

use iza_common::error::Result;

/// Which strategy materialized the container root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsStrategy {
    /// Overlay mount: image rootfs as lower layer, writes go to `upper/`.
    Overlay,
    /// Full recursive copy of the image rootfs.
    Copy,
}

/// A container's mutable root view over an immutable image rootfs.
///
/// Owns the per-container working directory. [`ContainerFs::release`]
/// (also invoked on drop) unmounts and removes it, so the directory is
/// gone on every exit path.
#[derive(Debug)]
pub struct ContainerFs {
    container_dir: PathBuf,
    root: PathBuf,
    strategy: FsStrategy,
    released: bool,
}

/// Whether the running kernel advertises overlay filesystem support.
#[must_use]
pub fn overlay_supported() -> bool {
    // /proc/filesystems lists one filesystem per line, e.g. "nodev\toverlay".
    fs::read_to_string("/proc/filesystems")
        .map(|list| {
            list.lines()
                .any(|line| line.split_whitespace().last() == Some("overlay"))
        })
        .unwrap_or(false)
}

impl ContainerFs {
    /// Materializes a mutable container root for `image_rootfs` inside
    /// `container_dir`.
    ///
    /// Tries the overlay strategy when the kernel advertises it; a failed
    /// overlay mount downgrades to the copy strategy rather than erroring.
    ///
    /// # Errors
    ///
    /// Returns [`iza_common::error::IzaError::FsSetupFailed`] when the
    /// copy fallback cannot complete; partial state is removed first.
    pub fn setup(image_rootfs: &Path, container_dir: &Path) -> Result<Self> {
        if overlay_supported() {
            match overlay::mount_overlay(image_rootfs, container_dir) {
                Ok(merged) => {
                    return Ok(Self {
                        container_dir: container_dir.to_path_buf(),
                        root: merged,
                        strategy: FsStrategy::Overlay,
                        released: false,
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "overlay mount failed, falling back to copy");
                    let _ = fs::remove_dir_all(container_dir);
                }
            }
        } else {
            tracing::debug!("kernel does not advertise overlay, using copy fallback");
        }

        match copy::copy_rootfs(image_rootfs, container_dir) {
            Ok(root) => Ok(Self {
                container_dir: container_dir.to_path_buf(),
                root,
                strategy: FsStrategy::Copy,
                released: false,
            }),
            Err(e) => {
                let _ = fs::remove_dir_all(container_dir);
                Err(e)
            }
        }
    }

    /// The directory the container will use as `/`.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Which strategy was used.
    #[must_use]
    pub fn strategy(&self) -> FsStrategy {
        self.strategy
    }

    /// Unmounts (overlay strategy) and removes the per-container working
    /// directory. Idempotent, and safe after a partially failed setup.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        if self.strategy == FsStrategy::Overlay {
            overlay::unmount_overlay(&self.root);
        }
        match fs::remove_dir_all(&self.container_dir) {
            Ok(()) => tracing::info!(path = %self.container_dir.display(), "container filesystem removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.container_dir.display(), error = %e, "container filesystem removal failed");
            }
        }
        self.released = true;
    }
}

impl Drop for ContainerFs {
    fn drop(&mut self) {
        self.release();
    }
}
