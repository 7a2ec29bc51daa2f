//! # iza — minimal container runtime
//!
//! One-shot CLI: pull images, list the local catalog, and run a single
//! command inside a fresh set of namespaces with optional resource caps.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod commands;
mod output;

use clap::Parser;

use crate::commands::Cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        }
    };

    match commands::execute(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("iza: {e:#}");
            std::process::exit(1);
        }
    }
}
