//! Memory resource control via cgroups v2.

use std::fs;
use std::path::Path;

use iza_common::error::{IzaError, Result};

/// Sets the hard memory limit for a cgroup.
///
/// Processes exceeding this limit are subject to the OOM killer.
///
/// # Errors
///
/// Returns [`IzaError::LimitRejected`] if writing to `memory.max` fails.
pub fn set_memory_max(cgroup_path: &Path, bytes: u64) -> Result<()> {
    let file = cgroup_path.join("memory.max");
    fs::write(&file, bytes.to_string()).map_err(|e| IzaError::LimitRejected { file, source: e })?;
    tracing::debug!(bytes, "memory max limit set");
    Ok(())
}
