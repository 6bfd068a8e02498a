//! Output formatting for scan results (JSON/CSV/table).

use std::io::Write;

use crate::core::TargetRecord;
use crate::util::errors::ReportError;

use super::types::ScanReport;

const HEADERS: [&str; 5] = ["os", "cpu", "verified", "source", "command"];
const TABLE_HEADERS: [&str; 5] = ["OS", "CPU", "Verified", "Source", "Command"];

/// Spaces between table columns.
const TABLE_PADDING: usize = 2;

/// Write the JSON envelope, pretty-printed, with a trailing newline.
pub fn write_json(out: &mut dyn Write, report: &ScanReport<'_>) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

/// Write a header row and one row per record.
pub fn write_csv(out: &mut dyn Write, records: &[TargetRecord]) -> Result<(), ReportError> {
    writeln!(out, "{}", HEADERS.join(","))?;

    for record in records {
        let row = fields(record)
            .iter()
            .map(|f| csv_field(f))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(out, "{}", row)?;
    }

    Ok(())
}

/// Write fixed-width columns with a separator row under the header.
pub fn write_table(out: &mut dyn Write, records: &[TargetRecord]) -> Result<(), ReportError> {
    let separator = TABLE_HEADERS.map(|h| "─".repeat(h.chars().count()));

    let mut rows: Vec<[String; 5]> = Vec::with_capacity(records.len() + 2);
    rows.push(TABLE_HEADERS.map(str::to_string));
    rows.push(separator);
    rows.extend(records.iter().map(fields));

    let mut widths = [0usize; 5];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    for row in &rows {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            line.push_str(cell);
            if i + 1 < row.len() {
                let pad = widths[i] - cell.chars().count() + TABLE_PADDING;
                line.push_str(&" ".repeat(pad));
            }
        }
        writeln!(out, "{}", line)?;
    }

    Ok(())
}

fn fields(record: &TargetRecord) -> [String; 5] {
    [
        record.os.clone(),
        record.cpu.clone(),
        record.verified.to_string(),
        record.source.to_string(),
        record.command.clone(),
    ]
}

/// Quote a CSV field when it contains a delimiter, quote or line break.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
