//! Empirical verification of target pairs.
//!
//! A pair is verified by asking nim to compile (without linking) a one-line
//! program for that target. Three modes, chosen from the config:
//! - skip: nothing is probed
//! - common (default): only mainstream OS x CPU pairs, sequentially
//! - all: every pair, on a bounded worker pool
//!
//! A failed probe only ever means `verified = false`; it never aborts a scan.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::core::{Axis, TargetRecord};
use crate::toolchain::Toolchain;
use crate::util::config::ScanConfig;

/// Case-insensitive substrings that mark a compile as failed even on a zero
/// exit status.
pub const ERROR_INDICATORS: &[&str] = &["error:", "invalid", "unknown", "unsupported", "failed"];

/// Verify-all progress is logged at every record index divisible by this.
pub const PROGRESS_INTERVAL: usize = 50;

/// Program fed to nim on stdin for each probe.
const PROBE_SOURCE: &str = "echo \"Hello, World!\"";

/// Why verification did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Requested,
    HardcodedOnly,
    ToolchainUnavailable,
}

/// Which records get probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMode {
    Skip(SkipReason),
    /// Sequential probing of the common subset only.
    Common,
    /// Every record, in parallel.
    All,
}

impl VerifyMode {
    /// Pick the mode for a scan.
    pub fn select(config: &ScanConfig, toolchain_available: bool) -> Self {
        if config.skip_verify {
            VerifyMode::Skip(SkipReason::Requested)
        } else if config.hardcoded_only {
            VerifyMode::Skip(SkipReason::HardcodedOnly)
        } else if !toolchain_available {
            VerifyMode::Skip(SkipReason::ToolchainUnavailable)
        } else if config.verify_all {
            VerifyMode::All
        } else {
            VerifyMode::Common
        }
    }
}

/// Arguments for a compile-only probe of one pair.
pub fn compile_args(os: &str, cpu: &str) -> Vec<String> {
    vec![
        Axis::Os.flag(os),
        Axis::Cpu.flag(cpu),
        "--compileOnly".to_string(),
        "--hints:off".to_string(),
        "--warnings:off".to_string(),
        "-".to_string(),
    ]
}

/// Whether compiler output contains any error indicator.
pub fn has_error_indicator(text: &str) -> bool {
    let lower = text.to_lowercase();
    ERROR_INDICATORS.iter().any(|needle| lower.contains(needle))
}

/// Try to compile for one pair.
///
/// Requires a zero exit and no error indicator in the output. Timeouts and
/// spawn failures count as unverified.
pub fn verify_target(toolchain: &dyn Toolchain, os: &str, cpu: &str, timeout: Duration) -> bool {
    let args = compile_args(os, cpu);
    match toolchain.run(&args, Some(PROBE_SOURCE.as_bytes()), timeout) {
        Ok(output) => output.success() && !has_error_indicator(&output.text),
        Err(e) => {
            tracing::debug!("probe for {}/{} failed: {}", os, cpu, e);
            false
        }
    }
}

/// Populate `verified` on `records` according to the selected mode.
///
/// Record order is preserved whatever order probes finish in.
pub fn verify_targets(
    toolchain: &dyn Toolchain,
    mut records: Vec<TargetRecord>,
    config: &ScanConfig,
    mode: VerifyMode,
) -> Result<Vec<TargetRecord>> {
    match mode {
        VerifyMode::Skip(reason) => {
            match reason {
                SkipReason::Requested => tracing::info!("Skipping verification as requested."),
                SkipReason::HardcodedOnly => {
                    tracing::info!("Skipping verification - hardcoded-only mode.")
                }
                SkipReason::ToolchainUnavailable => {
                    tracing::info!("Skipping verification - nim command not available.")
                }
            }
            Ok(records)
        }
        VerifyMode::Common => {
            tracing::info!("Verifying common targets...");
            for record in records.iter_mut() {
                if is_common(config, record) {
                    record.verified =
                        verify_target(toolchain, &record.os, &record.cpu, config.timeout);
                }
            }
            Ok(records)
        }
        VerifyMode::All => verify_all(toolchain, records, config),
    }
}

fn is_common(config: &ScanConfig, record: &TargetRecord) -> bool {
    config.common_os.iter().any(|os| *os == record.os)
        && config.common_cpu.iter().any(|cpu| *cpu == record.cpu)
}

/// Probe every record on a pool of `config.max_workers` threads.
///
/// The pool size is the admission limit. Each worker writes its result to its
/// own pre-allocated index; the lock covers only that one assignment and is
/// never held while a compiler process runs.
fn verify_all(
    toolchain: &dyn Toolchain,
    records: Vec<TargetRecord>,
    config: &ScanConfig,
) -> Result<Vec<TargetRecord>> {
    let total = records.len();
    tracing::info!(
        "Verifying all {} targets (this may take a while)...",
        total
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_workers)
        .thread_name(|i| format!("verify-{}", i))
        .build()
        .context("failed to start verification workers")?;

    let pairs: Vec<(String, String)> = records
        .iter()
        .map(|r| (r.os.clone(), r.cpu.clone()))
        .collect();
    let shared = Mutex::new(records);

    pool.install(|| {
        pairs.par_iter().enumerate().for_each(|(idx, (os, cpu))| {
            let verified = verify_target(toolchain, os, cpu, config.timeout);

            shared.lock().unwrap_or_else(PoisonError::into_inner)[idx].verified = verified;

            if idx % PROGRESS_INTERVAL == 0 {
                tracing::info!("Verified {}/{} targets...", idx + 1, total);
            }
        });
    });

    tracing::info!("Verification complete!");
    Ok(shared.into_inner().unwrap_or_else(PoisonError::into_inner))
}
