//! Global configuration model for the iza runtime.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-host storage layout consumed when wiring the store and launcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IzaConfig {
    /// Base directory for iza state and data.
    pub data_dir: PathBuf,
    /// Directory holding extracted image roots.
    pub images_dir: PathBuf,
    /// Directory holding downloaded archives.
    pub cache_dir: PathBuf,
    /// Directory holding per-container working directories.
    pub overlay_dir: PathBuf,
}

impl Default for IzaConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(crate::constants::DEFAULT_DATA_DIR),
            images_dir: PathBuf::from(crate::constants::DEFAULT_IMAGE_DIR),
            cache_dir: PathBuf::from(crate::constants::DEFAULT_CACHE_DIR),
            overlay_dir: PathBuf::from(crate::constants::DEFAULT_OVERLAY_DIR),
        }
    }
}
