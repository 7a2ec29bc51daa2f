//! `iza images` — list the local image catalog.

use clap::Args;

use iza_common::config::IzaConfig;
use iza_image::store::ImageStore;

use crate::output::format_bytes;

/// Arguments for the `images` command.
#[derive(Args, Debug)]
pub struct ImagesArgs {}

/// Executes the `images` command.
///
/// # Errors
///
/// Returns an error if the images directory cannot be read.
pub fn execute(_args: ImagesArgs) -> anyhow::Result<()> {
    let store = ImageStore::from_config(&IzaConfig::default());
    let entries = store.enumerate()?;

    println!("{:<24} {:<12} {:>10}", "REPOSITORY", "TAG", "SIZE");
    for entry in entries {
        println!(
            "{:<24} {:<12} {:>10}",
            entry.repository,
            entry.tag,
            format_bytes(entry.size_bytes)
        );
    }
    Ok(())
}
