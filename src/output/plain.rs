//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::scanner::StatsSnapshot;
use crate::storage::ScanReport;
use crate::types::{AddressRange, OpenPort, PortSet, ScanId};
use console::style;
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Print a report in human-readable plain text format.
pub fn print_plain(report: &ScanReport) -> io::Result<()> {
    write_plain(io::stdout().lock(), report)
}

/// Write a report in human-readable plain text format.
pub fn write_plain<W: Write>(mut out: W, report: &ScanReport) -> io::Result<()> {
    // Header
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                   {} Scan Results",
        style("portsweep").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    // Scan info
    writeln!(out, "  {} {}", style("Range:").bold(), report.address_spec)?;
    writeln!(out, "  {} {}", style("Ports:").bold(), report.ports)?;
    writeln!(
        out,
        "  {} {}",
        style("Scan ID:").bold(),
        style(report.id.short()).dim()
    )?;
    if report.cancelled {
        writeln!(out, "  {} {}", style("Status:").bold(), style("stopped").yellow())?;
    }
    writeln!(out)?;

    write_stats(&mut out, &report.stats, report.duration_ms())?;
    writeln!(out)?;

    // Result table
    if report.open_ports.is_empty() {
        writeln!(out, "  {}", style("No open ports found.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<15}  {:>6}  {}",
            style("HOST").bold(),
            style("PORT").bold(),
            style("STATE").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for open in &report.open_ports {
            writeln!(
                out,
                "  {:<15}  {:>6}  {}",
                open.host,
                open.port,
                style("open").green().bold()
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

fn write_stats<W: Write>(out: &mut W, stats: &StatsSnapshot, duration_ms: u64) -> io::Result<()> {
    writeln!(
        out,
        "  {} {} probes in {:.2}s (peak {} connections)",
        style("Statistics:").bold(),
        stats.probed(),
        duration_ms as f64 / 1000.0,
        stats.peak_connections
    )?;
    writeln!(
        out,
        "              {} open, {} closed, {} timed out",
        style(stats.open).green().bold(),
        style(stats.closed).red(),
        style(stats.timed_out).yellow()
    )?;
    if stats.cancelled + stats.skipped > 0 {
        writeln!(
            out,
            "              {} interrupted, {} skipped",
            style(stats.cancelled).dim(),
            style(stats.skipped).dim()
        )?;
    }
    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(id: ScanId, range: &AddressRange, ports: PortSet, jobs: usize) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("portsweep").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{} Scan ID: {}", style("•").dim(), style(id.short()).dim());
    println!(
        "{} Range: {} ({} addresses)",
        style("•").dim(),
        style(range).white().bold(),
        range.len()
    );
    println!(
        "{} Probing {} on {} jobs...",
        style("•").dim(),
        style(ports).yellow(),
        style(jobs).white().bold()
    );
    println!();
}

/// Styled line for a result printed as soon as it is delivered.
pub fn open_port_line(open: &OpenPort) -> String {
    format!("{} {}", style("+").green().bold(), open)
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}
