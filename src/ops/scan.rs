//! The scan driver.
//!
//! Runs the pipeline stages in order on a single thread: availability check,
//! detection per axis, catalog merge, matrix build. Only verification (in
//! verify-all mode) fans out.

use anyhow::Result;

use crate::core::{build_matrix, Axis, AxisCatalog, TargetRecord, REFERENCE_CPUS, REFERENCE_OSES};
use crate::ops::verify::{verify_targets, VerifyMode};
use crate::toolchain::{is_available, probe, Toolchain};
use crate::util::config::ScanConfig;

/// Everything a report needs from a finished scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// One record per (os, cpu) pair, sorted.
    pub records: Vec<TargetRecord>,
    /// Whether the toolchain answered the availability check.
    pub toolchain_available: bool,
    /// Whether full (verify-all) verification was requested.
    pub verification_run: bool,
    pub mode: VerifyMode,
}

/// Detected names for both axes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detection {
    pub oses: Vec<String>,
    pub cpus: Vec<String>,
}

/// Run detection for both axes.
pub fn detect_targets(toolchain: &dyn Toolchain) -> Detection {
    tracing::info!("Attempting to detect targets from nim help output...");

    let oses = probe(toolchain, Axis::Os);
    let cpus = probe(toolchain, Axis::Cpu);

    tracing::info!(
        "Detected {} OSes and {} CPUs from help output",
        oses.len(),
        cpus.len()
    );

    Detection { oses, cpus }
}

/// Merge detection results with the reference lists and build the matrix.
pub fn build_catalog(detection: &Detection, config: &ScanConfig) -> Vec<TargetRecord> {
    let mut oses = AxisCatalog::from_detected(&detection.oses);
    let mut cpus = AxisCatalog::from_detected(&detection.cpus);

    tracing::debug!("Adding hardcoded targets...");
    oses.merge_reference(
        REFERENCE_OSES
            .iter()
            .copied()
            .chain(config.extra_os.iter().map(String::as_str)),
    );
    cpus.merge_reference(
        REFERENCE_CPUS
            .iter()
            .copied()
            .chain(config.extra_cpu.iter().map(String::as_str)),
    );

    tracing::info!(
        "Total unique OSes: {} ({} detected), CPUs: {} ({} detected)",
        oses.len(),
        oses.detected_count(),
        cpus.len(),
        cpus.detected_count()
    );

    build_matrix(&oses, &cpus)
}

/// Scan for targets and verify them according to `config`.
///
/// A missing toolchain is not an error: the scan degrades to the reference
/// catalog with nothing verified, and the outcome records that.
pub fn scan_targets(toolchain: &dyn Toolchain, config: &ScanConfig) -> Result<ScanOutcome> {
    config.validate()?;

    // Hardcoded-only never spawns the toolchain, not even to check for it.
    let toolchain_available = !config.hardcoded_only && is_available(toolchain);

    if !config.hardcoded_only && !toolchain_available {
        tracing::warn!(
            "'{}' command not found. Using hardcoded target list only.",
            toolchain.display_name()
        );
    }

    let detection = if toolchain_available {
        detect_targets(toolchain)
    } else {
        Detection::default()
    };

    let records = build_catalog(&detection, config);

    let mode = VerifyMode::select(config, toolchain_available);
    let records = verify_targets(toolchain, records, config, mode)?;

    Ok(ScanOutcome {
        records,
        toolchain_available,
        verification_run: config.verification_run(),
        mode,
    })
}
