//! Archive download and extraction for `iza pull`.
//!
//! Pulls are direct archive downloads: a fixed table maps known
//! repository names onto canonical rootfs tarball URLs. No registry
//! protocol is spoken.

use std::fs::{self, File};
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;

use iza_common::error::{IzaError, Result};
use iza_common::types::ImageRef;

use crate::store::ImageStore;

/// Known repositories and their canonical rootfs archive URLs.
const KNOWN_IMAGES: &[(&str, &str)] = &[
    (
        "alpine",
        "https://dl-cdn.alpinelinux.org/alpine/v3.20/releases/x86_64/alpine-minirootfs-3.20.3-x86_64.tar.gz",
    ),
    (
        "ubuntu",
        "https://cdimage.ubuntu.com/ubuntu-base/releases/24.04/release/ubuntu-base-24.04.2-base-amd64.tar.gz",
    ),
    (
        "busybox",
        "https://github.com/docker-library/busybox/raw/dist-amd64/stable/glibc/busybox.tar.gz",
    ),
];

/// User-agent sent with every download request.
const USER_AGENT: &str = concat!("iza/", env!("CARGO_PKG_VERSION"));

/// Looks up the canonical archive URL for a repository name.
///
/// # Errors
///
/// Returns [`IzaError::UnsupportedImage`] for repositories outside the
/// table.
pub fn archive_url(name: &str) -> Result<&'static str> {
    KNOWN_IMAGES
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, url)| *url)
        .ok_or_else(|| IzaError::UnsupportedImage {
            name: name.to_string(),
        })
}

/// Downloads and extracts an image into the store; returns its `rootfs/`.
///
/// An archive already present in the cache is reused without
/// re-downloading; delete the cache file to force a fresh download.
///
/// # Errors
///
/// [`IzaError::UnsupportedImage`] for unknown repositories,
/// [`IzaError::DownloadFailed`] on network/HTTP errors (the partial cache
/// file is removed), [`IzaError::ExtractFailed`] on fatal extraction
/// errors (the image slot is removed).
pub fn pull(store: &ImageStore, image: &ImageRef) -> Result<std::path::PathBuf> {
    let url = archive_url(image.name())?;
    let archive = store.cached_archive(image);
    if archive.is_file() {
        tracing::info!(path = %archive.display(), "using cached archive");
    } else {
        download(url, &archive)?;
    }

    let slot = store.prepare_slot(image)?;
    let rootfs = slot.join("rootfs");
    if let Err(e) = extract_archive(&archive, &rootfs) {
        // A half-extracted slot must never be visible in the catalog.
        let _ = fs::remove_dir_all(&slot);
        return Err(e);
    }

    tracing::info!(image = %image, path = %rootfs.display(), "image pulled");
    Ok(rootfs)
}

/// Downloads `url` into `dest`, following redirects.
fn download(url: &str, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| IzaError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let failed = |reason: String| IzaError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    tracing::info!(url, "downloading archive");
    let result: Result<()> = (|| {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None)
            .build()
            .map_err(|e| failed(e.to_string()))?;
        let mut response = client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| failed(e.to_string()))?;
        let mut file = File::create(dest).map_err(|e| IzaError::Io {
            path: dest.to_path_buf(),
            source: e,
        })?;
        std::io::copy(&mut response, &mut file).map_err(|e| failed(e.to_string()))?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(dest);
    }
    result
}

/// Extracts a gzip-compressed tar archive into `rootfs`.
///
/// Permissions, modification times, and extended attributes are
/// restored. Every entry lands inside `rootfs`; entries whose paths
/// would escape it are skipped with a warning. Archives with a top-level
/// directory and flat archives are both accepted.
pub fn extract_archive(archive_path: &Path, rootfs: &Path) -> Result<()> {
    let fatal = |reason: String| IzaError::ExtractFailed {
        archive: archive_path.to_path_buf(),
        reason,
    };

    fs::create_dir_all(rootfs).map_err(|e| IzaError::Io {
        path: rootfs.to_path_buf(),
        source: e,
    })?;

    let file = File::open(archive_path).map_err(|e| IzaError::Io {
        path: archive_path.to_path_buf(),
        source: e,
    })?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.set_preserve_permissions(true);
    archive.set_preserve_mtime(true);
    archive.set_unpack_xattrs(true);

    for entry in archive.entries().map_err(|e| fatal(e.to_string()))? {
        let mut entry = entry.map_err(|e| fatal(e.to_string()))?;
        let shown_path = entry
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "<unreadable path>".to_string());
        match entry.unpack_in(rootfs) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(path = %shown_path, "archive entry escapes the image root, skipped");
            }
            Err(e) => return Err(fatal(format!("{shown_path}: {e}"))),
        }
    }

    tracing::debug!(path = %rootfs.display(), "archive extracted");
    Ok(())
}
