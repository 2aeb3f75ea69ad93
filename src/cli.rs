//! Command handler functions for the covtree CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::Config;
use crate::ingest;
use crate::report::{
    CoverageReport, JsonFormatter, PackageTableFormatter, ReportFormatter, SummaryFormatter,
};

/// Ingest every input file and build both trees.
pub fn load_report(files: &[PathBuf], config: &Config) -> Result<CoverageReport> {
    if files.is_empty() {
        anyhow::bail!("No coverage files given");
    }
    let facts = ingest::ingest_all(files, config.format.as_deref())
        .context("Failed to read coverage input")?;
    let options = config.report_options(Utc::now());
    CoverageReport::build(&facts, &options, config.compact_packages)
        .context("Failed to build coverage trees")
}

pub fn cmd_build(files: &[PathBuf], config: &Config) -> Result<String> {
    let report = load_report(files, config)?;
    let written = report.write_payloads(&config.output_dir).with_context(|| {
        format!(
            "Failed to write payloads to {}",
            config.output_dir.display()
        )
    })?;

    let mut out = String::new();
    for path in &written {
        out.push_str(&format!("Wrote {}\n", path.display()));
    }
    out.push_str(&SummaryFormatter.format(&report)?);
    Ok(out)
}

pub fn cmd_summary(files: &[PathBuf], config: &Config) -> Result<String> {
    let report = load_report(files, config)?;
    Ok(report.format(&SummaryFormatter)?)
}

pub fn cmd_packages(files: &[PathBuf], config: &Config, sort_by_coverage: bool) -> Result<String> {
    let report = load_report(files, config)?;
    Ok(report.format(&PackageTableFormatter { sort_by_coverage })?)
}

pub fn cmd_json(files: &[PathBuf], config: &Config) -> Result<String> {
    let report = load_report(files, config)?;
    Ok(report.format(&JsonFormatter)?)
}
