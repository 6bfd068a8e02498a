//! Error types shared across the scanner.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Invalid scan configuration. Always fatal, raised before any scan work.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot use --verify-all and --skip-verify together")]
    ConflictingVerifyFlags,

    #[error("unknown format: `{0}` (expected json, csv, or table)")]
    UnknownFormat(String),

    #[error("invalid duration `{0}` (use e.g. `30s`, `500ms`, `2m`, `1h`)")]
    InvalidDuration(String),

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("max_workers must be at least 1")]
    ZeroWorkers,

    #[error("invalid config file `{path}`: {message}")]
    ConfigFile { path: PathBuf, message: String },
}

/// Failure of a single toolchain invocation.
///
/// These are recovered locally by the caller: a failed detection invocation
/// falls through to the next variant, a failed verification probe resolves
/// to unverified.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("i/o error while running `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while writing the final report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
