//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use nim_targets::util::config::{parse_duration, FileConfig, ScanConfig};
use nim_targets::util::errors::ConfigError;

const AFTER_HELP: &str = "\
This tool scans for available Nim compilation targets by:
  1. Parsing nim help output using regex patterns (if nim is available)
  2. Including known hardcoded targets
  3. Optionally verifying targets by test compilation

Notes:
  - If the nim command is not found, only hardcoded targets are used
  - Use --hardcoded-only to skip nim detection entirely
  - Use --skip-verify to skip all verification steps";

/// Scan for the OS/CPU targets supported by the Nim compiler
#[derive(Parser, Debug)]
#[command(name = "nim-targets")]
#[command(author, version, about, long_about = None, after_help = AFTER_HELP)]
pub struct Cli {
    /// Output format: json, csv, or table
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Verify all targets (slow)
    #[arg(long)]
    pub verify_all: bool,

    /// Skip verification entirely
    #[arg(long)]
    pub skip_verify: bool,

    /// Use only hardcoded targets (never runs nim)
    #[arg(long)]
    pub hardcoded_only: bool,

    /// Timeout for each verification compile, e.g. 30s, 500ms, 2m [default: 30s]
    #[arg(long)]
    pub timeout: Option<String>,

    /// Path to the nim executable
    #[arg(long, env = "NIM")]
    pub nim: Option<PathBuf>,

    /// Read settings from a TOML file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Build the scan configuration: defaults, then the config file, then flags.
    pub fn scan_config(&self) -> Result<ScanConfig, ConfigError> {
        let mut config = ScanConfig::default();

        if let Some(path) = &self.config {
            config.apply_file(FileConfig::load(path)?)?;
        }

        config.verify_all = self.verify_all;
        config.skip_verify = self.skip_verify;
        config.hardcoded_only = self.hardcoded_only;

        if let Some(timeout) = &self.timeout {
            config.timeout = parse_duration(timeout)?;
        }
        if let Some(nim) = &self.nim {
            config.toolchain = nim.clone();
        }

        config.validate()?;
        Ok(config)
    }
}
