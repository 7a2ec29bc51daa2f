//! Local storage backend for extracted images and cached archives.
//!
//! Images live under `<images>/<name>:<tag>/rootfs/`; downloaded archives
//! under `<cache>/<name>:<tag>.tar.gz`. A listed image always has a
//! complete `rootfs/`: partial extractions are never left in a live slot.

use std::fs;
use std::path::{Path, PathBuf};

use iza_common::config::IzaConfig;
use iza_common::error::{IzaError, Result};
use iza_common::types::ImageRef;

/// Manages the on-disk image catalog.
#[derive(Debug, Clone)]
pub struct ImageStore {
    images_dir: PathBuf,
    cache_dir: PathBuf,
}

/// One catalog row as shown by `iza images`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Repository name.
    pub repository: String,
    /// Tag.
    pub tag: String,
    /// Approximate size: sum of regular-file sizes under `rootfs/`.
    pub size_bytes: u64,
}

impl ImageStore {
    /// Creates a store over explicit image and cache directories.
    #[must_use]
    pub fn new(images_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Creates a store from the configured storage layout.
    #[must_use]
    pub fn from_config(config: &IzaConfig) -> Self {
        Self::new(&config.images_dir, &config.cache_dir)
    }

    /// Returns the `rootfs/` path of an image, if it is present and
    /// readable with at least one entry.
    #[must_use]
    pub fn resolve(&self, image: &ImageRef) -> Option<PathBuf> {
        let rootfs = self.images_dir.join(image.to_string()).join("rootfs");
        let populated = fs::read_dir(&rootfs)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false);
        populated.then_some(rootfs)
    }

    /// Lists all images in directory-iteration order.
    ///
    /// Sub-directory names parse as `repo:tag` with a `latest` default;
    /// sizes are best-effort (errors count as zero).
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the images directory exists but cannot be
    /// read. A missing images directory yields an empty list.
    pub fn enumerate(&self) -> Result<Vec<ImageEntry>> {
        let dir = match fs::read_dir(&self.images_dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(IzaError::Io {
                    path: self.images_dir.clone(),
                    source: e,
                })
            }
        };

        let mut entries = Vec::new();
        for entry in dir.flatten() {
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let (repository, tag) = match name.split_once(':') {
                Some((repo, tag)) => (repo.to_string(), tag.to_string()),
                None => (name, "latest".to_string()),
            };
            entries.push(ImageEntry {
                repository,
                tag,
                size_bytes: tree_size(&entry.path().join("rootfs")),
            });
        }
        Ok(entries)
    }

    /// Computes the extraction slot for an image, creating parents and
    /// removing any stale directory at the slot.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the stale slot cannot be removed or the
    /// directory cannot be created.
    pub fn prepare_slot(&self, image: &ImageRef) -> Result<PathBuf> {
        let slot = self.images_dir.join(image.to_string());
        if slot.exists() {
            tracing::debug!(path = %slot.display(), "removing stale image slot");
            fs::remove_dir_all(&slot).map_err(|e| IzaError::Io {
                path: slot.clone(),
                source: e,
            })?;
        }
        fs::create_dir_all(&slot).map_err(|e| IzaError::Io {
            path: slot.clone(),
            source: e,
        })?;
        Ok(slot)
    }

    /// Path of the cached archive for an image.
    #[must_use]
    pub fn cached_archive(&self, image: &ImageRef) -> PathBuf {
        self.cache_dir.join(format!("{image}.tar.gz"))
    }
}

/// Best-effort recursive sum of regular-file sizes under `path`.
fn tree_size(path: &Path) -> u64 {
    let Ok(dir) = fs::read_dir(path) else {
        return 0;
    };
    let mut total = 0;
    for entry in dir.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            total += tree_size(&entry.path());
        } else if file_type.is_file() {
            total += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, ImageStore) {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let store = ImageStore::new(dir.path().join("images"), dir.path().join("cache"));
        (dir, store)
    }

    fn seed_image(store: &ImageStore, name: &str, files: &[(&str, &str)]) {
        let rootfs = store.images_dir.join(name).join("rootfs");
        fs::create_dir_all(&rootfs).unwrap();
        for (rel, contents) in files {
            let path = rootfs.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, contents).unwrap();
        }
    }

    #[test]
    fn resolve_finds_populated_rootfs() {
        let (_dir, store) = store();
        seed_image(&store, "alpine:latest", &[("etc/os-release", "Alpine\n")]);

        let rootfs = store.resolve(&ImageRef::parse("alpine")).expect("should resolve");
        assert!(rootfs.ends_with("alpine:latest/rootfs"));
    }

    #[test]
    fn resolve_misses_absent_and_empty_images() {
        let (_dir, store) = store();
        assert!(store.resolve(&ImageRef::parse("ghost")).is_none());

        // An empty rootfs is not a usable image.
        fs::create_dir_all(store.images_dir.join("hollow:latest/rootfs")).unwrap();
        assert!(store.resolve(&ImageRef::parse("hollow")).is_none());
    }

    #[test]
    fn enumerate_lists_every_pulled_image() {
        let (_dir, store) = store();
        seed_image(&store, "a:latest", &[("bin/x", "xx")]);
        seed_image(&store, "b:latest", &[("bin/y", "yyyy")]);

        let mut entries = store.enumerate().expect("enumerate failed");
        entries.sort_by(|l, r| l.repository.cmp(&r.repository));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].repository, "a");
        assert_eq!(entries[0].tag, "latest");
        assert_eq!(entries[0].size_bytes, 2);
        assert_eq!(entries[1].repository, "b");
        assert_eq!(entries[1].size_bytes, 4);
    }

    #[test]
    fn enumerate_defaults_untagged_directories_to_latest() {
        let (_dir, store) = store();
        fs::create_dir_all(store.images_dir.join("bare/rootfs")).unwrap();

        let entries = store.enumerate().expect("enumerate failed");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].repository, "bare");
        assert_eq!(entries[0].tag, "latest");
        assert_eq!(entries[0].size_bytes, 0);
    }

    #[test]
    fn enumerate_of_missing_store_is_empty() {
        let (_dir, store) = store();
        assert!(store.enumerate().expect("enumerate failed").is_empty());
    }

    #[test]
    fn prepare_slot_clears_stale_content() {
        let (_dir, store) = store();
        seed_image(&store, "alpine:latest", &[("stale", "old")]);

        let slot = store.prepare_slot(&ImageRef::parse("alpine")).expect("prepare failed");
        assert!(slot.is_dir());
        assert!(!slot.join("rootfs").exists());
    }

    #[test]
    fn cached_archive_is_named_by_reference() {
        let (_dir, store) = store();
        let path = store.cached_archive(&ImageRef::parse("alpine:3.20"));
        assert!(path.ends_with("alpine:3.20.tar.gz"));
    }
}
