//! # portsweep - A Concurrent TCP Connect Scanner
//!
//! portsweep probes every address of an IPv4 range on either a short list of
//! common service ports or the full port range, reporting each port that
//! accepts a TCP connection within a timeout.
//!
//! ## Features
//!
//! - **Flexible Ranges**: `/16` and `/24` CIDR blocks and dashed octet ranges
//! - **Bounded Concurrency**: work split into jobs, with a global ceiling on
//!   simultaneous connection attempts
//! - **Cooperative Cancellation**: a session can be stopped and drained at
//!   any time
//! - **Result Persistence**: text or JSON reports per session
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portsweep::scanner::{self, ScanConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ScanConfig::new("192.168.1.0/24").with_quick_scan(true);
//!     config.validate()?;
//!
//!     let mut handle = scanner::start(config, |open| println!("{}", open))?;
//!     let stats = handle.join().await?;
//!     println!("{} open of {} probed", stats.open, stats.probed());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Address ranges, port sets and results
//! - [`scanner`] - Probing, admission control, partitioning and sessions
//! - [`config`] - Limits and persisted settings
//! - [`storage`] - Result collection and reports
//! - [`error`] - Error types
//! - [`output`] - Output formatting utilities
//! - [`cli`] - Command line front-end

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ScanError};
pub use scanner::{start, ScanConfig, ScanHandle, StatsSnapshot};
pub use types::{AddressRange, OpenPort, PortSet, RangeError, ScanId};
