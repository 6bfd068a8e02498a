//! Core data structures.
//!
//! This module contains the value types a scan passes between stages:
//! - Axes and provenance tags
//! - Target records (one per (os, cpu) pair)
//! - Per-axis catalogs and the matrix builder

pub mod catalog;
pub mod record;

pub use catalog::{build_matrix, merge, AxisCatalog, REFERENCE_CPUS, REFERENCE_OSES};
pub use record::{invocation_hint, Axis, Provenance, Source, TargetRecord};
