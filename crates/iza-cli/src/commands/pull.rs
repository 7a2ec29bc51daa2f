//! `iza pull` — download an image archive into the local catalog.

use clap::Args;

use iza_common::config::IzaConfig;
use iza_common::types::ImageRef;
use iza_image::{fetch, store::ImageStore};

/// Arguments for the `pull` command.
#[derive(Args, Debug)]
pub struct PullArgs {
    /// Image reference (`name[:tag]`, tag defaults to `latest`).
    pub image: String,
}

/// Executes the `pull` command.
///
/// # Errors
///
/// Returns an error for unknown repositories, download failures, and
/// extraction failures.
pub fn execute(args: PullArgs) -> anyhow::Result<()> {
    let store = ImageStore::from_config(&IzaConfig::default());
    let image = ImageRef::parse(&args.image);
    let rootfs = fetch::pull(&store, &image)?;
    println!("Pulled {image} -> {}", rootfs.display());
    Ok(())
}
