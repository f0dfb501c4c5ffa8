//! Result collection and report persistence.
//!
//! The scanner only hands results to a callback; this module aggregates them
//! and writes reports after a session ends.

mod collector;
mod report;

pub use collector::ResultCollector;
pub use report::{ReportFormat, ReportStore, ScanReport};
