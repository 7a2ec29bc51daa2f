//! Legacy synthesized minimal root filesystem.
//!
//! Development facility used when `run` is given a bare command instead
//! of an image: stages allow-listed host binaries plus their dynamic
//! loader dependency closures into a throwaway root at `/tmp/iza-rootfs`.
//! Rebuilt from scratch on every run and never torn down afterwards.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use iza_common::constants::{CONTAINER_HOSTNAME, LEGACY_ROOTFS_DIR};
use iza_common::error::{IzaError, Result};

/// Directory skeleton of the synthesized root.
const SKELETON_DIRS: &[&str] = &[
    "bin",
    "usr",
    "usr/bin",
    "etc",
    "proc",
    "tmp",
    "dev",
    "lib",
    "lib64",
    "lib/x86_64-linux-gnu",
    "usr/lib",
    "usr/lib/x86_64-linux-gnu",
];

/// Host executables staged into the minimal root when present.
const HOST_BINARIES: &[&str] = &[
    "/bin/bash",
    "/bin/ls",
    "/bin/ps",
    "/usr/bin/whoami",
    "/bin/cat",
    "/usr/bin/stress",
    "/bin/sh",
    "/bin/hostname",
    "/usr/bin/yes",
    "/usr/bin/head",
    "/bin/rm",
    "/usr/bin/du",
    "/bin/sleep",
    "/usr/bin/timeout",
];

/// Dynamic loader locations expected by glibc binaries.
const LOADERS: &[&str] = &["/lib64/ld-linux-x86-64.so.2", "/lib/ld-linux.so.2"];

/// Builds the minimal root at its fixed location and returns the path.
///
/// # Errors
///
/// Returns an I/O error if the skeleton cannot be created.
pub fn build_minimal_root() -> Result<PathBuf> {
    let rootfs = PathBuf::from(LEGACY_ROOTFS_DIR);
    build_minimal_root_at(&rootfs)?;
    Ok(rootfs)
}

/// Builds the minimal root under an explicit directory.
///
/// # Errors
///
/// Returns an I/O error if the skeleton cannot be created; missing host
/// binaries and unresolvable libraries are skipped, not errors.
pub fn build_minimal_root_at(rootfs: &Path) -> Result<()> {
    let io = |path: PathBuf| move |e: std::io::Error| IzaError::Io { path, source: e };

    if rootfs.exists() {
        fs::remove_dir_all(rootfs).map_err(io(rootfs.to_path_buf()))?;
    }
    for dir in SKELETON_DIRS {
        let path = rootfs.join(dir);
        fs::create_dir_all(&path).map_err(io(path.clone()))?;
    }

    for binary in HOST_BINARIES {
        let source = Path::new(binary);
        let dest = rootfs.join(binary.trim_start_matches('/'));
        if stage_host_file(source, &dest).is_ok() {
            tracing::debug!(binary, "staged host binary");
            stage_dependency_closure(source, rootfs);
        } else {
            tracing::debug!(binary, "host binary not found, skipped");
        }
    }

    for loader in LOADERS {
        let source = Path::new(loader);
        if source.exists() {
            let dest = rootfs.join(loader.trim_start_matches('/'));
            let _ = stage_host_file(source, &dest);
        }
    }

    let hostname = rootfs.join("etc/hostname");
    fs::write(&hostname, format!("{CONTAINER_HOSTNAME}\n")).map_err(io(hostname.clone()))?;
    let passwd = rootfs.join("etc/passwd");
    fs::write(&passwd, "root:x:0:0:root:/root:/bin/bash\n").map_err(io(passwd.clone()))?;

    tracing::info!(path = %rootfs.display(), "legacy minimal root ready");
    Ok(())
}

/// Copies one host file into the root, creating parent directories.
/// `fs::copy` carries the file mode over.
fn stage_host_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, dest).map(|_| ())
}

/// Stages every library the host loader resolves for `binary`.
///
/// Best-effort: a missing `ldd` or an unresolvable line only costs the
/// corresponding library.
fn stage_dependency_closure(binary: &Path, rootfs: &Path) {
    let output = match Command::new("ldd").arg(binary).output() {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!(error = %e, "ldd unavailable, skipping dependency closure");
            return;
        }
    };

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        if let Some(library) = parse_loader_line(line) {
            let dest = rootfs.join(library.to_string_lossy().trim_start_matches('/'));
            let _ = stage_host_file(&library, &dest);
        }
    }
}

/// Parses one line of loader introspection output.
///
/// Recognizes `name => /path (0xADDR)` and `/path (0xADDR)`; vdso-style
/// lines without an absolute path yield `None`.
fn parse_loader_line(line: &str) -> Option<PathBuf> {
    let paren = line.find(" (0x")?;
    let head = &line[..paren];
    let path = match head.find(" => ") {
        Some(arrow) => &head[arrow + 4..],
        None => head,
    };
    let path = path.trim();
    path.starts_with('/').then(|| PathBuf::from(path))
}
