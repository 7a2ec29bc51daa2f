//! Container lifecycle orchestration.
//!
//! One `run` invocation stages the filesystem, prepares the optional
//! cgroup, clones the child into fresh namespaces, attaches it, waits,
//! and unwinds every acquired resource in reverse order. Teardown is
//! carried by drop guards so it happens on every exit path, early
//! returns included.

use std::path::{Path, PathBuf};

use nix::sched::{clone, CloneFlags};
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitStatus};

use iza_common::constants::ROOT_LINK_PREFIX;
use iza_common::error::{IzaError, Result};
use iza_common::types::{ContainerId, ImageRef, ResourceLimits};
use iza_core::cgroup::Cgroup;
use iza_core::filesystem::ContainerFs;
use iza_image::store::ImageStore;

use crate::{child, legacy};

/// Stack handed to the cloned child.
const CHILD_STACK_SIZE: usize = 1024 * 1024;

/// Everything `iza run` resolved from the command line.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Image to run, or `None` for the legacy minimal root.
    pub image: Option<ImageRef>,
    /// Program path and argument vector executed inside the container.
    pub command: Vec<String>,
    /// Optional memory and CPU caps.
    pub limits: ResourceLimits,
}

/// Removes the well-known root symlink when dropped.
struct RootLinkGuard {
    path: PathBuf,
}

impl RootLinkGuard {
    /// Installs `/tmp/iza-container-<pid>` pointing at the container
    /// root, replacing any stale link from a previous run.
    fn install(root: &Path) -> Result<Self> {
        let path = PathBuf::from(format!("{ROOT_LINK_PREFIX}{}", std::process::id()));
        let _ = std::fs::remove_file(&path);
        std::os::unix::fs::symlink(root, &path).map_err(|e| IzaError::Io {
            path: path.clone(),
            source: e,
        })?;
        Ok(Self { path })
    }
}

impl Drop for RootLinkGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Runs one container to completion and returns its exit code.
///
/// # Errors
///
/// Surfaces [`IzaError::ImageNotFound`], filesystem and cgroup setup
/// errors, and [`IzaError::SpawnFailed`] when the clone call is refused.
/// All acquired resources are released before an error propagates.
pub fn run_container(spec: &LaunchSpec, store: &ImageStore, overlay_dir: &Path) -> Result<i32> {
    let id = ContainerId::generate();
    tracing::info!(id = %id, command = ?spec.command, "launching container");

    // Filesystem stage. Guards declared in acquisition order drop in
    // reverse: cgroup, then symlink, then container filesystem.
    let mut container_fs: Option<ContainerFs> = None;
    let root = match &spec.image {
        Some(image) => {
            let image_rootfs = store.resolve(image).ok_or_else(|| IzaError::ImageNotFound {
                reference: image.to_string(),
            })?;
            let fs = ContainerFs::setup(&image_rootfs, &overlay_dir.join(id.as_str()))?;
            let root = fs.root().to_path_buf();
            container_fs = Some(fs);
            root
        }
        None => legacy::build_minimal_root()?,
    };

    let _link = RootLinkGuard::install(&root)?;

    // Cgroup stage.
    let cgroup = if spec.limits.is_limited() {
        let cg = Cgroup::create(&id)?;
        cg.apply_limits(&spec.limits)?;
        Some(cg)
    } else {
        None
    };

    // Child stage. The closure owns its copies; the parent pid is
    // captured here because getppid() inside the fresh pid namespace
    // reports 0.
    let parent_pid = std::process::id();
    let command = spec.command.clone();
    let mut stack = vec![0u8; CHILD_STACK_SIZE];
    let flags = CloneFlags::CLONE_NEWPID
        | CloneFlags::CLONE_NEWNS
        | CloneFlags::CLONE_NEWUTS
        | CloneFlags::CLONE_NEWIPC
        | CloneFlags::CLONE_NEWNET;

    // SAFETY: the callback touches only data it owns, and the stack
    // outlives the child because waitpid below blocks until it exits.
    let child_pid = unsafe {
        clone(
            Box::new(move || child::child_entry(parent_pid, &command)),
            &mut stack,
            flags,
            Some(Signal::SIGCHLD as i32),
        )
    }
    .map_err(|e| IzaError::SpawnFailed {
        reason: e.to_string(),
    })?;
    tracing::info!(pid = child_pid.as_raw(), "container process started");

    // Attach stage: best-effort, so a brief pre-attach window exists.
    if let Some(cg) = &cgroup {
        if let Err(e) = cg.attach(child_pid.as_raw()) {
            tracing::warn!(error = %e, "could not attach container to cgroup");
        }
    }

    // Wait stage.
    let status = waitpid(child_pid, None).map_err(|e| IzaError::SpawnFailed {
        reason: format!("wait for container failed: {e}"),
    })?;
    let code = exit_code(&status);
    tracing::info!(code, "container exited");
    Ok(code)
}

/// Maps a wait status onto the exit-code contract: the child's status
/// byte on normal exit, `128 + signal` on signal death, `1` otherwise.
#[must_use]
pub fn exit_code(status: &WaitStatus) -> i32 {
    match status {
        WaitStatus::Exited(_, code) => *code,
        WaitStatus::Signaled(_, signal, _) => 128 + *signal as i32,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::Pid;

    #[test]
    fn normal_exit_keeps_the_status_byte() {
        let status = WaitStatus::Exited(Pid::from_raw(1), 42);
        assert_eq!(exit_code(&status), 42);
    }

    #[test]
    fn signal_death_maps_to_128_plus_signal() {
        let status = WaitStatus::Signaled(Pid::from_raw(1), Signal::SIGKILL, false);
        assert_eq!(exit_code(&status), 137);
        let status = WaitStatus::Signaled(Pid::from_raw(1), Signal::SIGTERM, false);
        assert_eq!(exit_code(&status), 143);
    }

    #[test]
    fn other_dispositions_map_to_one() {
        let status = WaitStatus::StillAlive;
        assert_eq!(exit_code(&status), 1);
    }
}
