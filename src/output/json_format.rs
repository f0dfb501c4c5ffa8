//! JSON output formatting.

use crate::storage::ScanReport;
use std::io::{self, Write};

/// Write a report as pretty JSON.
pub fn write_json<W: Write>(mut out: W, report: &ScanReport) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    writeln!(out, "{}", json)
}

/// Print a report in JSON format.
pub fn print_json(report: &ScanReport) -> io::Result<()> {
    write_json(io::stdout().lock(), report)
}
