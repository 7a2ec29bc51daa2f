//! # iza-runtime
//!
//! Container lifecycle orchestration: filesystem staging, cgroup wiring,
//! namespace spawn, wait, and guaranteed teardown on every exit path.

pub mod child;
pub mod launcher;
pub mod legacy;
