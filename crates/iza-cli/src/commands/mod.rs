//! CLI command definitions and dispatch.

pub mod images;
pub mod pull;
pub mod run;

use clap::{Parser, Subcommand};

/// iza — minimal single-container runtime.
#[derive(Parser, Debug)]
#[command(name = "iza", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download an image archive into the local catalog.
    Pull(pull::PullArgs),
    /// List images in the local catalog.
    Images(images::ImagesArgs),
    /// Run a command inside a fresh container.
    Run(run::RunArgs),
}

/// Dispatches the parsed CLI command; returns the process exit code.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Command::Pull(args) => pull::execute(args).map(|()| 0),
        Command::Images(args) => images::execute(args).map(|()| 0),
        Command::Run(args) => run::execute(args),
    }
}
