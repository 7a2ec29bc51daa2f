//! Cgroups v2 resource management.
//!
//! Creates one control group per container under the unified hierarchy
//! at `/sys/fs/cgroup`, applies memory and CPU caps, and attaches the
//! container process.

pub mod cpu;
pub mod memory;

use std::fs;
use std::path::{Path, PathBuf};

use iza_common::constants::CGROUP_V2_PATH;
use iza_common::error::{IzaError, Result};
use iza_common::types::{ContainerId, ResourceLimits};

/// Handle to one container's control group.
///
/// Once `create` succeeds the directory exists on disk and this handle
/// carries the teardown obligation until [`Cgroup::release`] runs (also
/// invoked on drop, so every exit path tears down).
#[derive(Debug)]
pub struct Cgroup {
    /// Path to this container's cgroup directory.
    path: PathBuf,
    created: bool,
}

impl Cgroup {
    /// Creates a new cgroup for the given container ID under the live
    /// unified hierarchy.
    ///
    /// # Errors
    ///
    /// Returns [`IzaError::CgroupsUnavailable`] when the unified hierarchy
    /// is not mounted, or an I/O error if the directory cannot be created.
    pub fn create(id: &ContainerId) -> Result<Self> {
        Self::create_under(Path::new(CGROUP_V2_PATH), id)
    }

    /// Creates the cgroup under an explicit hierarchy root.
    ///
    /// Split out from [`Cgroup::create`] so tests can run against a
    /// scratch directory instead of the live kernel hierarchy.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Cgroup::create`].
    pub fn create_under(base: &Path, id: &ContainerId) -> Result<Self> {
        if !base.join("cgroup.controllers").exists() {
            return Err(IzaError::CgroupsUnavailable);
        }

        let path = base.join(id.as_str());
        fs::create_dir(&path).map_err(|e| IzaError::Io {
            path: path.clone(),
            source: e,
        })?;

        // Some kernels reject this write in a leaf cgroup; tolerated.
        let subtree = path.join("cgroup.subtree_control");
        if let Err(e) = fs::write(&subtree, "+memory +cpu") {
            tracing::debug!(path = %subtree.display(), error = %e, "subtree_control write rejected");
        }

        tracing::info!(path = %path.display(), "cgroup created");
        Ok(Self {
            path,
            created: true,
        })
    }

    /// Applies the configured caps to this cgroup.
    ///
    /// # Errors
    ///
    /// Returns [`IzaError::LimitRejected`] if the kernel refuses a cap
    /// write.
    pub fn apply_limits(&self, limits: &ResourceLimits) -> Result<()> {
        if let Some(bytes) = limits.memory_bytes {
            memory::set_memory_max(&self.path, bytes)?;
        }
        if let Some(cpu_max) = limits.cpu_max {
            cpu::set_cpu_max(&self.path, cpu_max)?;
        }
        Ok(())
    }

    /// Adds a process to this cgroup by writing its PID.
    ///
    /// # Errors
    ///
    /// Returns [`IzaError::AttachFailed`] if writing to `cgroup.procs`
    /// fails.
    pub fn attach(&self, pid: i32) -> Result<()> {
        let procs = self.path.join("cgroup.procs");
        fs::write(&procs, pid.to_string()).map_err(|e| IzaError::AttachFailed { pid, source: e })?;
        tracing::debug!(pid, "process attached to cgroup");
        Ok(())
    }

    /// Path of the cgroup directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the cgroup directory. Idempotent.
    ///
    /// Removal failures are tolerated: the kernel reaps empty cgroups on
    /// its own once the member processes are gone.
    pub fn release(&mut self) {
        if !self.created {
            return;
        }
        match fs::remove_dir(&self.path) {
            Ok(()) => tracing::info!(path = %self.path.display(), "cgroup removed"),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "cgroup removal left to the kernel");
            }
        }
        self.created = false;
    }
}

impl Drop for Cgroup {
    fn drop(&mut self) {
        self.release();
    }
}
