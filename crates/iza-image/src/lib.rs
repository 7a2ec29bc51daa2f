//! # iza-image
//!
//! Local image catalog and archive fetching: images are single-layer
//! root filesystem snapshots stored on disk, pulled as gzip-compressed
//! tar archives from a fixed table of known URLs.

pub mod fetch;
pub mod store;
