//! System-wide constants and default paths.

/// Default base directory for iza data.
pub const DEFAULT_DATA_DIR: &str = "/var/lib/iza";

/// Default directory for extracted image roots.
pub const DEFAULT_IMAGE_DIR: &str = "/var/lib/iza/images";

/// Default directory for downloaded image archives.
pub const DEFAULT_CACHE_DIR: &str = "/var/lib/iza/cache";

/// Default directory for per-container working directories.
pub const DEFAULT_OVERLAY_DIR: &str = "/var/lib/iza/overlay";

/// Cgroups v2 unified hierarchy mount point.
pub const CGROUP_V2_PATH: &str = "/sys/fs/cgroup";

/// Hostname set inside every container's UTS namespace.
pub const CONTAINER_HOSTNAME: &str = "iza-container";

/// Prefix of the well-known symlink the child follows to its root;
/// the launcher pid is appended.
pub const ROOT_LINK_PREFIX: &str = "/tmp/iza-container-";

/// Location of the legacy synthesized minimal root.
pub const LEGACY_ROOTFS_DIR: &str = "/tmp/iza-rootfs";

/// Tag assumed when an image reference carries none.
pub const DEFAULT_TAG: &str = "latest";

/// Command executed when an image is run without one.
pub const DEFAULT_COMMAND: &str = "/bin/bash";
