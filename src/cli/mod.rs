//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `portsweep scan <spec>` - Scan an address range
//! - `portsweep check <spec>` - Validate an address specification
//! - `portsweep config` - Show or initialize settings

mod check;
mod config;
mod scan;

pub use check::CheckCommand;
pub use config::ConfigCommand;
pub use scan::ScanCommand;

use crate::config::{AppSettings, Paths};
use crate::error::CliResult;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// portsweep - A concurrent TCP connect scanner for IPv4 ranges.
///
/// Probes every address of a CIDR block or dashed octet range on either
/// the common service ports or the full port range, with a global ceiling
/// on simultaneous connection attempts.
#[derive(Parser, Debug)]
#[command(name = "portsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A concurrent TCP connect scanner for IPv4 ranges", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan an address range for open ports
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Check an address specification without scanning
    #[command(alias = "c")]
    Check(CheckCommand),

    /// Show or initialize settings
    Config(ConfigCommand),
}

impl Cli {
    /// Dispatch to the selected subcommand.
    pub async fn run(&self) -> CliResult<()> {
        match &self.command {
            Commands::Scan(cmd) => {
                let paths = Paths::new()?;
                let settings = self.load_settings(&paths)?;
                cmd.execute(&settings, &paths, self.quiet).await
            }
            Commands::Check(cmd) => cmd.execute(self.quiet),
            Commands::Config(cmd) => cmd.execute(&Paths::new()?, self.config.as_deref()),
        }
    }

    fn load_settings(&self, paths: &Paths) -> CliResult<AppSettings> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load(paths)?,
        };
        Ok(settings)
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}
