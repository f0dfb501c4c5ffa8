//! Check subcommand implementation.
//!
//! Handles `portsweep check <spec>`: parses an address specification and
//! reports what a scan of it would cover.

use crate::error::CliResult;
use crate::output;
use crate::types::{AddressRange, PortSet};
use clap::Parser;
use console::style;

/// Check an address specification without scanning.
#[derive(Parser, Debug)]
pub struct CheckCommand {
    /// Address range to check
    ///
    /// Examples:
    ///   192.168.1.0/24       CIDR block (/16 or /24, network base only)
    ///   10.0.0.1-50          Dashed octet range
    ///   10.0-1.0.1           Ranges in any octet
    #[arg(value_name = "SPEC")]
    pub spec: String,
}

impl CheckCommand {
    /// Execute the check command.
    pub fn execute(&self, quiet: bool) -> CliResult<()> {
        let range = AddressRange::parse(&self.spec)?;

        if quiet {
            println!("{}", range);
            return Ok(());
        }

        let addresses = range.len() as u64;
        output::print_success(&format!("{} is a valid address range", self.spec));
        println!("  {} {}", style("Range:").bold(), range);
        println!(
            "  {} {} - {}",
            style("Bounds:").bold(),
            range.begin(),
            range.end()
        );
        println!("  {} {}", style("Addresses:").bold(), addresses);
        println!(
            "  {} {} (quick) / {} (full)",
            style("Probes:").bold(),
            addresses * PortSet::Common.len() as u64,
            addresses * PortSet::Full.len() as u64
        );

        Ok(())
    }
}
