//! nim-targets CLI - discover and verify Nim cross-compilation targets

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;
use nim_targets::report::{write_report, OutputFormat, ScanSummary};
use nim_targets::{scan_targets, NimToolchain};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; the report owns stdout
    let default_filter = if cli.verbose {
        "nim_targets=debug"
    } else if cli.quiet {
        "nim_targets=warn"
    } else {
        "nim_targets=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Reject bad configuration before touching the toolchain
    let format: OutputFormat = cli.format.parse()?;
    let config = cli.scan_config()?;

    let nim = NimToolchain::new(&config.toolchain);
    let outcome = scan_targets(&nim, &config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, format, &outcome).context("failed to write output")?;

    // JSON carries the counts itself
    if format != OutputFormat::Json {
        let summary = ScanSummary::from_records(&outcome.records);
        tracing::info!(
            "{} targets: {} verified, {} detected, {} hardcoded",
            summary.total_count,
            summary.verified_count,
            summary.detected_count,
            summary.hardcoded_count
        );
    }

    Ok(())
}
