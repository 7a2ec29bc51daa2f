//! Copy-based fallback for hosts without overlay support.

use std::fs;
use std::path::{Path, PathBuf};

use iza_common::error::{IzaError, Result};

/// Copies the image rootfs into `container_dir/rootfs` and returns it.
///
/// # Errors
///
/// Any failure while walking or copying is fatal and surfaces as
/// [`IzaError::FsSetupFailed`].
pub fn copy_rootfs(image_rootfs: &Path, container_dir: &Path) -> Result<PathBuf> {
    let root = container_dir.join("rootfs");
    fs::create_dir_all(&root).map_err(|e| IzaError::FsSetupFailed {
        path: root.clone(),
        source: e,
    })?;
    copy_tree(image_rootfs, &root)?;
    tracing::info!(path = %root.display(), "image rootfs copied");
    Ok(root)
}

/// Recursively copies `src` into `dst`.
///
/// Symbolic links are recreated as links, never dereferenced. Directory
/// modes are carried over; `fs::copy` already preserves file modes.
/// Special files (devices, fifos, sockets) are skipped.
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    let failed = |path: &Path, source: std::io::Error| IzaError::FsSetupFailed {
        path: path.to_path_buf(),
        source,
    };

    let entries = fs::read_dir(src).map_err(|e| failed(src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| failed(src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| failed(&from, e))?;

        if file_type.is_symlink() {
            let target = fs::read_link(&from).map_err(|e| failed(&from, e))?;
            std::os::unix::fs::symlink(&target, &to).map_err(|e| failed(&to, e))?;
        } else if file_type.is_dir() {
            fs::create_dir(&to).map_err(|e| failed(&to, e))?;
            let metadata = fs::metadata(&from).map_err(|e| failed(&from, e))?;
            fs::set_permissions(&to, metadata.permissions()).map_err(|e| failed(&to, e))?;
            copy_tree(&from, &to)?;
        } else if file_type.is_file() {
            fs::copy(&from, &to).map_err(|e| failed(&from, e))?;
        } else {
            tracing::debug!(path = %from.display(), "special file skipped by copy fallback");
        }
    }
    Ok(())
}
