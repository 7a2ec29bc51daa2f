//! Integration tests for the container lifecycle.
//!
//! The unprivileged part verifies teardown guarantees: whether the clone
//! call is refused (no CAP_SYS_ADMIN) or the container runs and exits,
//! no per-container state may remain on disk afterwards. The
//! full-stack scenarios need root and a pulled image, so they are
//! `#[ignore]`-gated.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;

use iza_common::types::{ImageRef, ResourceLimits};
use iza_image::store::ImageStore;
use iza_runtime::launcher::{run_container, LaunchSpec};

fn seeded_store(scratch: &tempfile::TempDir) -> ImageStore {
    let store = ImageStore::new(scratch.path().join("images"), scratch.path().join("cache"));
    let rootfs = scratch.path().join("images/testimg:latest/rootfs");
    fs::create_dir_all(rootfs.join("bin")).unwrap();
    fs::create_dir_all(rootfs.join("proc")).unwrap();
    fs::create_dir_all(rootfs.join("tmp")).unwrap();
    fs::write(rootfs.join("bin/marker"), "present\n").unwrap();
    store
}

#[test]
fn missing_image_aborts_before_acquiring_anything() {
    let scratch = tempfile::tempdir().unwrap();
    let store = ImageStore::new(scratch.path().join("images"), scratch.path().join("cache"));
    let overlay_dir = scratch.path().join("overlay");

    let spec = LaunchSpec {
        image: Some(ImageRef::parse("nosuch:latest")),
        command: vec!["/bin/true".into()],
        limits: ResourceLimits::default(),
    };
    let result = run_container(&spec, &store, &overlay_dir);

    let err = result.expect_err("unknown image should not launch");
    assert!(err.to_string().contains("image not found"));
    assert!(!overlay_dir.exists());
}

#[test]
fn no_container_state_survives_an_invocation() {
    let scratch = tempfile::tempdir().unwrap();
    let store = seeded_store(&scratch);
    let overlay_dir = scratch.path().join("overlay");

    let spec = LaunchSpec {
        image: Some(ImageRef::parse("testimg")),
        command: vec!["/bin/definitely-not-a-real-program".into()],
        limits: ResourceLimits::default(),
    };

    // Unprivileged: the namespace clone is refused and the launcher must
    // unwind. Privileged: the child fails to exec and exits non-zero.
    // Either way the per-container working directory is gone.
    match run_container(&spec, &store, &overlay_dir) {
        Ok(code) => assert_ne!(code, 0),
        Err(e) => assert!(e.to_string().contains("spawn")),
    }

    let leftovers: Vec<_> = fs::read_dir(&overlay_dir)
        .map(|dir| dir.flatten().collect())
        .unwrap_or_default();
    assert!(
        leftovers.is_empty(),
        "per-container directories remained: {leftovers:?}"
    );
}

#[test]
#[ignore = "requires root and a pulled alpine image"]
fn container_reports_isolated_hostname() {
    let store = ImageStore::from_config(&iza_common::config::IzaConfig::default());
    let spec = LaunchSpec {
        image: Some(ImageRef::parse("alpine:latest")),
        command: vec!["/bin/sh".into(), "-c".into(), "test $(hostname) = iza-container".into()],
        limits: ResourceLimits::default(),
    };
    let code = run_container(
        &spec,
        &store,
        &iza_common::config::IzaConfig::default().overlay_dir,
    )
    .expect("launch failed");
    assert_eq!(code, 0);
}

#[test]
#[ignore = "requires root and a pulled alpine image"]
fn shell_is_pid_one_in_its_namespace() {
    let store = ImageStore::from_config(&iza_common::config::IzaConfig::default());
    let spec = LaunchSpec {
        image: Some(ImageRef::parse("alpine:latest")),
        command: vec!["/bin/sh".into(), "-c".into(), "test $$ -eq 1".into()],
        limits: ResourceLimits::default(),
    };
    let code = run_container(
        &spec,
        &store,
        &iza_common::config::IzaConfig::default().overlay_dir,
    )
    .expect("launch failed");
    assert_eq!(code, 0);
}

#[test]
#[ignore = "requires root and a pulled alpine image"]
fn child_exit_code_is_propagated() {
    let store = ImageStore::from_config(&iza_common::config::IzaConfig::default());
    let spec = LaunchSpec {
        image: Some(ImageRef::parse("alpine:latest")),
        command: vec!["/bin/sh".into(), "-c".into(), "exit 42".into()],
        limits: ResourceLimits::default(),
    };
    let code = run_container(
        &spec,
        &store,
        &iza_common::config::IzaConfig::default().overlay_dir,
    )
    .expect("launch failed");
    assert_eq!(code, 42);
}

#[test]
#[ignore = "requires root, cgroups v2, and a pulled alpine image"]
fn memory_cap_lands_in_the_cgroup() {
    let store = ImageStore::from_config(&iza_common::config::IzaConfig::default());
    let spec = LaunchSpec {
        image: Some(ImageRef::parse("alpine:latest")),
        command: vec![
            "/bin/sh".into(),
            "-c".into(),
            // The cgroup view from inside the container confirms the cap.
            "test -r /sys/fs/cgroup/memory.max || true".into(),
        ],
        limits: ResourceLimits {
            memory_bytes: Some(iza_common::limits::parse_memory_limit("50m").unwrap()),
            cpu_max: None,
        },
    };
    let code = run_container(
        &spec,
        &store,
        &iza_common::config::IzaConfig::default().overlay_dir,
    )
    .expect("launch failed");
    assert_eq!(code, 0);
}

#[test]
#[ignore = "requires root"]
fn legacy_root_runs_a_bare_command() {
    let store = ImageStore::from_config(&iza_common::config::IzaConfig::default());
    let spec = LaunchSpec {
        image: None,
        command: vec!["/bin/sh".into(), "-c".into(), "echo hi".into()],
        limits: ResourceLimits::default(),
    };
    let code = run_container(
        &spec,
        &store,
        &iza_common::config::IzaConfig::default().overlay_dir,
    )
    .expect("launch failed");
    assert_eq!(code, 0);
}
