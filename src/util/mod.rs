//! Shared utilities

pub mod config;
pub mod errors;
pub mod process;

pub use config::ScanConfig;
pub use errors::{ConfigError, ProbeError, ReportError};
