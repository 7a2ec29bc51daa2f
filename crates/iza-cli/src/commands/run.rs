//! `iza run` — execute a command inside a fresh container.

use clap::Args;

use iza_common::config::IzaConfig;
use iza_common::constants::DEFAULT_COMMAND;
use iza_common::limits::{parse_cpu_limit, parse_memory_limit};
use iza_common::types::{ImageRef, ResourceLimits};
use iza_image::store::ImageStore;
use iza_runtime::launcher::{self, LaunchSpec};

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Memory cap, e.g. `100m` or `1g`.
    #[arg(long)]
    pub memory: Option<String>,

    /// CPU cap as a fraction of one core, e.g. `0.5` or `2`.
    #[arg(long)]
    pub cpus: Option<String>,

    /// Image reference or command path, followed by command arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Executes the `run` command; returns the container's exit code.
///
/// # Errors
///
/// Returns an error for unparseable limits and launch failures.
pub fn execute(args: RunArgs) -> anyhow::Result<i32> {
    let limits = ResourceLimits {
        memory_bytes: args.memory.as_deref().map(parse_memory_limit).transpose()?,
        cpu_max: args.cpus.as_deref().map(parse_cpu_limit).transpose()?,
    };

    let config = IzaConfig::default();
    let store = ImageStore::from_config(&config);
    let spec = resolve_spec(&store, args.command, limits);
    tracing::debug!(image = ?spec.image, command = ?spec.command, "run request resolved");

    let code = launcher::run_container(&spec, &store, &config.overlay_dir)?;
    Ok(code)
}

/// Decides whether the first token names an image or a host command.
///
/// A token containing `:` is always an image reference; otherwise it is
/// one exactly when an image of that name exists locally. An image
/// without a command runs `/bin/bash`.
fn resolve_spec(store: &ImageStore, mut tokens: Vec<String>, limits: ResourceLimits) -> LaunchSpec {
    let first = tokens.remove(0);
    let is_image = first.contains(':') || store.resolve(&ImageRef::parse(&first)).is_some();

    if is_image {
        let command = if tokens.is_empty() {
            vec![DEFAULT_COMMAND.to_string()]
        } else {
            tokens
        };
        LaunchSpec {
            image: Some(ImageRef::parse(&first)),
            command,
            limits,
        }
    } else {
        let mut command = vec![first];
        command.append(&mut tokens);
        LaunchSpec {
            image: None,
            command,
            limits,
        }
    }
}
