//! Domain primitive types used across the iza workspace.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TAG;

/// A parsed image reference: repository name plus tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    name: String,
    tag: String,
}

impl ImageRef {
    /// Parses a user-supplied `name[:tag]` string.
    ///
    /// Splits on the first `:`; a missing tag defaults to `latest`.
    /// No further normalization is applied.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        match input.split_once(':') {
            Some((name, tag)) => Self {
                name: name.to_string(),
                tag: tag.to_string(),
            },
            None => Self {
                name: input.to_string(),
                tag: DEFAULT_TAG.to_string(),
            },
        }
    }

    /// Repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}

/// Unique identifier for one container invocation.
///
/// Names both the per-container working directory and the cgroup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    /// Creates a container ID from an existing string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates the ID for this invocation: `iza-<pid>-<unix-seconds>`.
    ///
    /// Mixing the launcher pid with the wall-clock second keeps two
    /// concurrent invocations on one host from colliding.
    #[must_use]
    pub fn generate() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        Self(format!("iza-{}-{}", std::process::id(), secs))
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A CPU bandwidth cap in cgroup v2 `cpu.max` terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuMax {
    /// Allowed run time per period, in microseconds.
    pub quota_us: u64,
    /// Accounting period, in microseconds.
    pub period_us: u64,
}

/// Resource limits for a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Memory limit in bytes.
    pub memory_bytes: Option<u64>,
    /// CPU bandwidth cap.
    pub cpu_max: Option<CpuMax>,
}

impl ResourceLimits {
    /// Whether any cap is set, i.e. whether a cgroup is required.
    #[must_use]
    pub fn is_limited(&self) -> bool {
        self.memory_bytes.is_some() || self.cpu_max.is_some()
    }
}
