//! Configuration management for portsweep.
//!
//! Provides XDG-compliant settings storage and the bounds every scan
//! configuration is validated against.

pub mod limits;
mod settings;

pub use settings::{AppSettings, Paths};
pub(crate) use settings::check_range;
