//! Report types.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::core::{Source, TargetRecord};
use crate::ops::ScanOutcome;
use crate::util::errors::ConfigError;

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON envelope (default)
    #[default]
    Json,
    /// One header row plus one row per record
    Csv,
    /// Aligned columns for terminals
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "table" => Ok(OutputFormat::Table),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Record counts used by the JSON envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub total_count: usize,
    pub verified_count: usize,
    pub detected_count: usize,
    pub hardcoded_count: usize,
}

impl ScanSummary {
    pub fn from_records(records: &[TargetRecord]) -> Self {
        let count = |source: Source| records.iter().filter(|r| r.source == source).count();

        ScanSummary {
            total_count: records.len(),
            verified_count: records.iter().filter(|r| r.verified).count(),
            detected_count: count(Source::Detected),
            hardcoded_count: count(Source::Hardcoded),
        }
    }
}

/// The JSON envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport<'a> {
    pub targets: &'a [TargetRecord],

    #[serde(flatten)]
    pub summary: ScanSummary,

    /// RFC 3339 UTC timestamp.
    pub generated_at: String,

    pub verification_run: bool,

    pub nim_available: bool,
}

impl<'a> ScanReport<'a> {
    /// Build a report stamped with the current time.
    pub fn new(outcome: &'a ScanOutcome) -> Self {
        ScanReport::with_timestamp(
            outcome,
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }

    pub fn with_timestamp(outcome: &'a ScanOutcome, generated_at: String) -> Self {
        ScanReport {
            targets: &outcome.records,
            summary: ScanSummary::from_records(&outcome.records),
            generated_at,
            verification_run: outcome.verification_run,
            nim_available: outcome.toolchain_available,
        }
    }
}
