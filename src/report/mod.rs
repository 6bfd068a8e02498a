//! Result serialization.
//!
//! Every format carries the same per-record fields: `os`, `cpu`,
//! `verified`, `source` and `command`. Only the JSON envelope adds summary
//! counts and scan metadata.

mod format;
mod types;

use std::io::Write;

pub use format::{write_csv, write_json, write_table};
pub use types::{OutputFormat, ScanReport, ScanSummary};

use crate::ops::ScanOutcome;
use crate::util::errors::ReportError;

/// Write `outcome` to `out` in the requested format.
pub fn write_report(
    out: &mut dyn Write,
    format: OutputFormat,
    outcome: &ScanOutcome,
) -> Result<(), ReportError> {
    match format {
        OutputFormat::Json => write_json(out, &ScanReport::new(outcome))?,
        OutputFormat::Csv => write_csv(out, &outcome.records)?,
        OutputFormat::Table => write_table(out, &outcome.records)?,
    }
    out.flush()?;
    Ok(())
}
