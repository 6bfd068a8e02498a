//! Scan configuration.
//!
//! A scan is driven by a [`ScanConfig`], assembled from (lowest to highest
//! precedence):
//! - built-in defaults
//! - an optional TOML file passed with `--config`
//! - command-line flags
//!
//! The config is validated once, before any toolchain process is spawned.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::util::errors::ConfigError;

/// Default per-probe timeout for verification compiles.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the `nim --version` availability check.
pub const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for each detection invocation.
pub const DETECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on concurrent verification probes in verify-all mode.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Default toolchain program name.
pub const DEFAULT_TOOLCHAIN: &str = "nim";

/// Operating systems probed by the default (fast path) verification.
pub const COMMON_OSES: &[&str] = &["linux", "windows", "macosx", "freebsd"];

/// CPUs probed by the default (fast path) verification.
pub const COMMON_CPUS: &[&str] = &["amd64", "i386", "arm", "arm64"];

/// Everything a single scan needs to know.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Probe every pair in the matrix using the worker pool.
    pub verify_all: bool,
    /// Skip verification entirely.
    pub skip_verify: bool,
    /// Never invoke the toolchain; report the reference catalog only.
    pub hardcoded_only: bool,
    /// Timeout for each verification compile.
    pub timeout: Duration,
    /// Toolchain program (name on PATH or explicit path).
    pub toolchain: PathBuf,
    /// Maximum concurrent verification probes.
    pub max_workers: usize,
    pub common_os: Vec<String>,
    pub common_cpu: Vec<String>,
    /// Extra names appended to the reference OS list.
    pub extra_os: Vec<String>,
    /// Extra names appended to the reference CPU list.
    pub extra_cpu: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            verify_all: false,
            skip_verify: false,
            hardcoded_only: false,
            timeout: DEFAULT_TIMEOUT,
            toolchain: PathBuf::from(DEFAULT_TOOLCHAIN),
            max_workers: DEFAULT_MAX_WORKERS,
            common_os: to_strings(COMMON_OSES),
            common_cpu: to_strings(COMMON_CPUS),
            extra_os: Vec::new(),
            extra_cpu: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.verify_all && self.skip_verify {
            return Err(ConfigError::ConflictingVerifyFlags);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.max_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }

    /// Whether the report should claim full verification ran.
    pub fn verification_run(&self) -> bool {
        self.verify_all && !self.skip_verify
    }

    /// Apply values from a config file. Only fields present in the file change.
    pub fn apply_file(&mut self, file: FileConfig) -> Result<(), ConfigError> {
        if let Some(timeout) = file.timeout {
            self.timeout = parse_duration(&timeout)?;
        }
        if let Some(nim) = file.nim {
            self.toolchain = nim;
        }
        if let Some(workers) = file.max_workers {
            self.max_workers = workers;
        }
        if let Some(common_os) = file.common_os {
            self.common_os = common_os;
        }
        if let Some(common_cpu) = file.common_cpu {
            self.common_cpu = common_cpu;
        }
        self.extra_os.extend(file.extra_os);
        self.extra_cpu.extend(file.extra_cpu);
        Ok(())
    }
}

/// On-disk configuration (`--config <path>`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Verification timeout, e.g. `"45s"`.
    pub timeout: Option<String>,

    /// Path to the nim executable.
    pub nim: Option<PathBuf>,

    pub max_workers: Option<usize>,

    /// Replaces the fast-path OS set.
    pub common_os: Option<Vec<String>>,

    /// Replaces the fast-path CPU set.
    pub common_cpu: Option<Vec<String>>,

    /// Additional reference OS names.
    pub extra_os: Vec<String>,

    /// Additional reference CPU names.
    pub extra_cpu: Vec<String>,
}

impl FileConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Parse a Go-style duration such as `30s`, `500ms`, `2m`, `1h` or `1m30s`.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let input = s.trim().to_lowercase();
    let invalid = || ConfigError::InvalidDuration(s.to_string());

    if input.is_empty() {
        return Err(invalid());
    }

    let mut total = Duration::ZERO;
    let mut rest = input.as_str();

    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        if digits == 0 {
            return Err(invalid());
        }
        let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let part = match &rest[..unit_len] {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value.saturating_mul(60)),
            "h" => Duration::from_secs(value.saturating_mul(3600)),
            _ => return Err(invalid()),
        };
        total += part;
        rest = &rest[unit_len..];
    }

    Ok(total)
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
