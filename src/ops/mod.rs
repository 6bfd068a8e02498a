//! High-level operations.
//!
//! This module contains the scan driver and the verifier.

pub mod scan;
pub mod verify;

pub use scan::{build_catalog, detect_targets, scan_targets, Detection, ScanOutcome};
pub use verify::{verify_target, verify_targets, SkipReason, VerifyMode};
