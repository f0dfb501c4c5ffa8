//! Core value types: address ranges, port sets, results and session IDs.
//!
//! Parsing and validation happen here so the scanner only ever sees
//! well-formed ranges.

mod open_port;
mod ports;
mod range;
mod scan_id;

pub use open_port::OpenPort;
pub use ports::{PortSet, COMMON_PORTS, FULL_RANGE};
pub use range::{AddressRange, RangeError};
pub use scan_id::{ScanId, ScanIdError};
