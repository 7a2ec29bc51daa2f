//! CPU resource control via cgroups v2.

use std::fs;
use std::path::Path;

use iza_common::error::{IzaError, Result};
use iza_common::types::CpuMax;

/// Sets the CPU bandwidth limit for a cgroup.
///
/// `cpu.max` takes the quota and period as two space-separated decimal
/// microsecond counts.
///
/// # Errors
///
/// Returns [`IzaError::LimitRejected`] if writing to `cpu.max` fails.
pub fn set_cpu_max(cgroup_path: &Path, cpu_max: CpuMax) -> Result<()> {
    let file = cgroup_path.join("cpu.max");
    let value = format!("{} {}", cpu_max.quota_us, cpu_max.period_us);
    fs::write(&file, value).map_err(|e| IzaError::LimitRejected { file, source: e })?;
    tracing::debug!(
        quota_us = cpu_max.quota_us,
        period_us = cpu_max.period_us,
        "cpu max limit set"
    );
    Ok(())
}
