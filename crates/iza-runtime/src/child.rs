//! Code that runs inside the freshly created namespaces.
//!
//! The cloned child is pid 1 of its pid namespace. It sets the
//! container hostname, finds its root through the well-known symlink,
//! changes root, mounts fresh `/proc` and `/tmp`, and replaces itself
//! with the requested command.

use std::convert::Infallible;
use std::ffi::CString;
use std::path::PathBuf;

use nix::mount::{mount, MsFlags};
use nix::unistd::{chdir, chroot, execv, sethostname};

use iza_common::constants::{CONTAINER_HOSTNAME, ROOT_LINK_PREFIX};
use iza_common::error::{IzaError, Result};

/// Entry point of the container process.
///
/// Never returns on success (`execv` replaces the process image); the
/// returned value becomes the child's exit code on failure.
pub fn child_entry(parent_pid: u32, command: &[String]) -> isize {
    match enter(parent_pid, command) {
        Ok(never) => match never {},
        Err(e) => {
            tracing::error!(error = %e, "container setup failed");
            1
        }
    }
}

fn enter(parent_pid: u32, command: &[String]) -> Result<Infallible> {
    let sys = |op: &'static str| {
        move |e: nix::errno::Errno| IzaError::Syscall {
            op,
            reason: e.to_string(),
        }
    };

    if command.is_empty() {
        return Err(IzaError::SpawnFailed {
            reason: "empty container command".to_string(),
        });
    }

    sethostname(CONTAINER_HOSTNAME).map_err(sys("sethostname"))?;

    // The launcher published the container root before cloning us.
    let link = PathBuf::from(format!("{ROOT_LINK_PREFIX}{parent_pid}"));
    let root = std::fs::read_link(&link).map_err(|e| IzaError::Io {
        path: link,
        source: e,
    })?;

    chroot(&root).map_err(sys("chroot"))?;
    chdir("/").map_err(sys("chdir"))?;

    // A fresh procfs makes `ps` see the new pid namespace. Both mounts
    // are best-effort.
    if let Err(e) = mount(
        Some("proc"),
        "/proc",
        Some("proc"),
        MsFlags::empty(),
        None::<&str>,
    ) {
        tracing::warn!(error = %e, "could not mount /proc");
    }
    if let Err(e) = mount(
        Some("tmpfs"),
        "/tmp",
        Some("tmpfs"),
        MsFlags::empty(),
        None::<&str>,
    ) {
        tracing::warn!(error = %e, "could not mount /tmp");
    }

    let program = CString::new(command[0].as_str()).map_err(|_| IzaError::SpawnFailed {
        reason: "command contains an interior NUL byte".to_string(),
    })?;
    let argv = command
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| IzaError::SpawnFailed {
            reason: "argument contains an interior NUL byte".to_string(),
        })?;

    tracing::debug!(program = %command[0], "executing container command");
    execv(&program, &argv).map_err(sys("execv"))
}
