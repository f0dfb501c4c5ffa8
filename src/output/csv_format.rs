//! CSV output formatting.

use crate::storage::ScanReport;
use std::io::{self, Write};

/// Write one `host,port` row per open port.
pub fn write_csv<W: Write>(out: W, report: &ScanReport) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["host", "port"])?;
    for open in &report.open_ports {
        wtr.write_record([open.host.as_str(), &open.port.to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Print a report in CSV format.
pub fn print_csv(report: &ScanReport) -> io::Result<()> {
    write_csv(io::stdout().lock(), report)
}
