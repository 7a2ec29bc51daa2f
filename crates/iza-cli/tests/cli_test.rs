//! End-to-end tests for the `iza` binary.
//!
//! The unprivileged tests cover the failure surface reachable without
//! root or network: unknown images, unparseable limits, and argument
//! errors. The full scenarios (pull, isolated run, resource caps,
//! legacy root) need root and a pulled image, so they are
//! `#[ignore]`-gated.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::process::{Command, Output};

fn iza(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_iza"))
        .args(args)
        .output()
        .expect("failed to spawn iza")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ── Unprivileged failure surface ─────────────────────────────────────

#[test]
fn run_of_unknown_image_fails_with_image_not_found() {
    let output = iza(&["run", "nosuch:latest", "/bin/sh"]);

    assert_ne!(output.status.code(), Some(0));
    let message = stderr(&output);
    assert!(
        message.contains("image not found: nosuch:latest"),
        "stderr was: {message}"
    );
    assert!(message.contains("iza pull"), "stderr was: {message}");
}

#[test]
fn run_with_bad_memory_limit_exits_one() {
    let output = iza(&["run", "--memory", "10x", "/bin/true"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid resource limit"));
}

#[test]
fn run_with_bad_cpu_limit_exits_one() {
    let output = iza(&["run", "--cpus=-1", "/bin/true"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid resource limit"));
}

#[test]
fn pull_of_unknown_repository_fails() {
    let output = iza(&["pull", "mystery:latest"]);

    assert_ne!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("unsupported image"));
}

#[test]
fn missing_arguments_exit_one_with_usage() {
    let output = iza(&["run"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Usage"));
}

// ── Full scenarios (root + pulled image) ─────────────────────────────

#[test]
#[ignore = "requires root and network"]
fn pulled_image_appears_in_the_catalog() {
    let pull = iza(&["pull", "alpine:latest"]);
    assert_eq!(pull.status.code(), Some(0), "pull failed: {}", stderr(&pull));

    let images = iza(&["images"]);
    assert_eq!(images.status.code(), Some(0));
    let listing = stdout(&images);
    let row = listing
        .lines()
        .find(|line| line.starts_with("alpine"))
        .expect("alpine missing from catalog");
    assert!(row.contains("latest"));
}

#[test]
#[ignore = "requires root and a pulled alpine image"]
fn container_hostname_is_isolated() {
    let output = iza(&["run", "alpine:latest", "/bin/sh", "-c", "hostname"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "iza-container");
}

#[test]
#[ignore = "requires root and a pulled alpine image"]
fn shell_runs_as_pid_one() {
    let output = iza(&["run", "alpine:latest", "/bin/sh", "-c", "ps"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let listing = stdout(&output);
    let shell_row = listing
        .lines()
        .find(|line| line.contains("/bin/sh"))
        .expect("shell missing from ps output");
    assert!(shell_row.trim_start().starts_with('1'), "ps was: {listing}");
}

#[test]
#[ignore = "requires root, cgroups v2, and a pulled alpine image"]
fn run_with_memory_cap_completes() {
    let output = iza(&["run", "--memory", "50m", "alpine:latest", "/bin/sh", "-c", "true"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
}

#[test]
#[ignore = "requires root"]
fn legacy_root_echoes_from_a_bare_command() {
    let output = iza(&["run", "/bin/sh", "-c", "echo hi"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "hi");
}
