//! Parsing of human-readable resource limit strings.
//!
//! Memory limits are `<decimal>[bkmg]` with binary multipliers; CPU limits
//! are decimal fractions of one core mapped onto a cgroup v2 `cpu.max`
//! quota over a fixed 100ms period.

use crate::error::{IzaError, Result};
use crate::types::CpuMax;

/// Fixed CPU accounting period in microseconds.
pub const CPU_PERIOD_US: u64 = 100_000;

/// Converts a memory limit string such as `100m` or `2g` to bytes.
///
/// The suffix is case-insensitive; an absent suffix means bytes.
///
/// # Errors
///
/// Returns [`IzaError::InvalidLimit`] when the numeric part does not parse,
/// the suffix is not one of `b`, `k`, `m`, `g`, or the value is not
/// positive.
pub fn parse_memory_limit(input: &str) -> Result<u64> {
    let invalid = |reason: &str| IzaError::InvalidLimit {
        value: input.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    let Some(last) = trimmed.chars().last() else {
        return Err(invalid("empty limit"));
    };

    let (digits, multiplier) = if last.is_ascii_digit() {
        (trimmed, 1u64)
    } else {
        let digits = &trimmed[..trimmed.len() - last.len_utf8()];
        let multiplier = match last.to_ascii_lowercase() {
            'b' => 1,
            'k' => 1024,
            'm' => 1024 * 1024,
            'g' => 1024 * 1024 * 1024,
            _ => return Err(invalid("unknown unit, use b, k, m, or g")),
        };
        (digits, multiplier)
    };

    let value: u64 = digits
        .parse()
        .map_err(|_| invalid("numeric part is not a positive integer"))?;
    if value == 0 {
        return Err(invalid("limit must be positive"));
    }
    value
        .checked_mul(multiplier)
        .ok_or_else(|| invalid("limit overflows the byte range"))
}

/// Converts a CPU limit string such as `0.5` or `2` to a `cpu.max` pair.
///
/// The quota is `round(cpus * 100000)` microseconds over the fixed
/// [`CPU_PERIOD_US`] period.
///
/// # Errors
///
/// Returns [`IzaError::InvalidLimit`] when the input is not a positive
/// decimal number.
pub fn parse_cpu_limit(input: &str) -> Result<CpuMax> {
    let invalid = |reason: &str| IzaError::InvalidLimit {
        value: input.to_string(),
        reason: reason.to_string(),
    };

    let cpus: f64 = input
        .trim()
        .parse()
        .map_err(|_| invalid("not a decimal number"))?;
    if !cpus.is_finite() || cpus <= 0.0 {
        return Err(invalid("CPU fraction must be positive"));
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let quota_us = (cpus * CPU_PERIOD_US as f64).round() as u64;
    Ok(CpuMax {
        quota_us,
        period_us: CPU_PERIOD_US,
    })
}
