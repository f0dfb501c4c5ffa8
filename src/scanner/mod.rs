//! Scanner module - orchestrates a TCP connect scan over an address range.
//!
//! A session parses the address range, splits the work into jobs and runs
//! each job as its own tokio task. Every probe passes through the session's
//! [`ConnectionBudget`] and observes its cancellation token.
//!
//! ```rust,ignore
//! use portsweep::scanner::{self, ScanConfig};
//!
//! let config = ScanConfig::new("192.168.1.0/24").with_quick_scan(true);
//! let mut handle = scanner::start(config, |open| println!("{}", open))?;
//! handle.join().await?;
//! ```

pub mod admission;
pub mod context;
pub mod executor;
pub mod probe;
pub mod run;
pub mod session;

pub use admission::{BudgetSlot, ConnectionBudget};
pub use context::{OnOpenPort, ScanContext, ScanStats, StatsSnapshot};
pub use executor::{partition, ScanExecutor};
pub use probe::{probe, Connector, ProbeOutcome, TcpConnector};
pub use run::{IterationOrder, ScanRun};
pub use session::{start, start_with_connector, ScanConfig, ScanHandle};
