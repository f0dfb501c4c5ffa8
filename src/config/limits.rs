//! Bounds and defaults for scan configuration values.

use std::time::Duration;

/// Shortest accepted per-connect timeout.
pub const MIN_TIMEOUT_MS: u64 = 100;
/// Longest accepted per-connect timeout.
pub const MAX_TIMEOUT_MS: u64 = 8000;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Upper bound on concurrent scan jobs.
pub const MAX_TASKS: usize = 4000;
pub const DEFAULT_TASKS: usize = 100;

/// Upper bound on the connection ceiling.
pub const MAX_CONNECTIONS: usize = 20_000;
pub const DEFAULT_MAX_CONNECTIONS: usize = 10_000;

/// Largest address range a session will materialize (a /8 worth).
///
/// Dashed ranges can describe up to 2^32 addresses; those are rejected
/// before any address list is allocated.
pub const MAX_ADDRESSES: usize = 1 << 24;

/// Wait between admission attempts while the connection budget is full.
pub const ADMISSION_BACKOFF: Duration = Duration::from_secs(1);
