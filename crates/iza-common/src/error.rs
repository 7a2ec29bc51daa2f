//! Unified error types for the iza workspace.
//!
//! Every fallible core operation surfaces one of these variants; the CLI
//! edge wraps them in `anyhow` for display.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum IzaError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A memory or CPU limit string could not be parsed.
    #[error("invalid resource limit '{value}': {reason}")]
    InvalidLimit {
        /// The offending user input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A `pull` named a repository with no known archive URL.
    #[error("unsupported image '{name}': no known archive URL")]
    UnsupportedImage {
        /// Repository name as given by the user.
        name: String,
    },

    /// Network or HTTP failure while fetching an archive.
    #[error("download of {url} failed: {reason}")]
    DownloadFailed {
        /// URL that was being fetched.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// An archive could not be extracted into its image slot.
    #[error("extraction of {archive} failed: {reason}")]
    ExtractFailed {
        /// Path of the archive being extracted.
        archive: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// `run` named an image that is not in the local catalog.
    #[error("image not found: {reference} (try `iza pull {reference}`)")]
    ImageNotFound {
        /// The image reference rendered as `name:tag`.
        reference: String,
    },

    /// The copy-based container filesystem could not be completed.
    #[error("container filesystem setup failed at {path}: {source}")]
    FsSetupFailed {
        /// Path being created or copied when the failure occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The cgroup v2 unified hierarchy is not mounted on this host.
    #[error("cgroups v2 unified hierarchy not available")]
    CgroupsUnavailable,

    /// The kernel refused a resource cap write.
    #[error("kernel rejected resource cap at {file}: {source}")]
    LimitRejected {
        /// Control file that rejected the write.
        file: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A process could not be placed into its cgroup.
    #[error("failed to attach process {pid} to cgroup: {source}")]
    AttachFailed {
        /// Process that could not be attached.
        pid: i32,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The clone-with-namespaces call was refused.
    #[error("failed to spawn container process: {reason}")]
    SpawnFailed {
        /// Description of the failure.
        reason: String,
    },

    /// A namespace, mount, or other kernel call failed.
    #[error("{op} failed: {reason}")]
    Syscall {
        /// Operation that failed.
        op: &'static str,
        /// Kernel error description.
        reason: String,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, IzaError>;
