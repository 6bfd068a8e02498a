//! nim-targets - discover and verify Nim cross-compilation targets
//!
//! This crate finds the (OS, CPU) pairs the Nim compiler supports by mining
//! its help and error output, merges them with a reference catalog, and
//! optionally verifies each pair with a real compile-only probe.

pub mod core;
pub mod extract;
pub mod ops;
pub mod report;
pub mod toolchain;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a mock toolchain that records invocations
/// instead of spawning processes.
#[cfg(test)]
pub mod test_support;

pub use core::{Axis, AxisCatalog, Source, TargetRecord};
pub use extract::extract;
pub use ops::{scan_targets, ScanOutcome};
pub use report::OutputFormat;
pub use toolchain::{NimToolchain, Toolchain};
pub use util::config::ScanConfig;
