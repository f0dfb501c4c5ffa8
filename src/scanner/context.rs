//! State shared by every job of one scan session.

use super::admission::ConnectionBudget;
use super::probe::{Connector, ProbeOutcome};
use crate::types::OpenPort;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Callback invoked once per open port, from whichever job found it.
///
/// It may run concurrently on several worker threads; the receiver does its
/// own synchronization.
pub type OnOpenPort = Arc<dyn Fn(OpenPort) + Send + Sync>;

/// Everything a probe needs: connector, budget, cancellation, timeout and
/// the result callback.
pub struct ScanContext {
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) budget: Arc<ConnectionBudget>,
    pub(crate) cancel: CancellationToken,
    pub(crate) timeout: Duration,
    pub(crate) on_open: OnOpenPort,
    pub(crate) stats: ScanStats,
}

impl ScanContext {
    /// Create a context with a fresh cancellation token.
    pub fn new(
        connector: Arc<dyn Connector>,
        budget: Arc<ConnectionBudget>,
        timeout: Duration,
        on_open: OnOpenPort,
    ) -> Self {
        Self {
            connector,
            budget,
            cancel: CancellationToken::new(),
            timeout,
            on_open,
            stats: ScanStats::default(),
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn budget(&self) -> &ConnectionBudget {
        &self.budget
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current outcome counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.budget.peak())
    }
}

/// Outcome counters, updated by every probe.
#[derive(Debug, Default)]
pub struct ScanStats {
    open: AtomicU64,
    closed: AtomicU64,
    timed_out: AtomicU64,
    cancelled: AtomicU64,
    skipped: AtomicU64,
}

impl ScanStats {
    pub fn record(&self, outcome: ProbeOutcome) {
        let counter = match outcome {
            ProbeOutcome::Open => &self.open,
            ProbeOutcome::Closed => &self.closed,
            ProbeOutcome::TimedOut => &self.timed_out,
            ProbeOutcome::Cancelled => &self.cancelled,
            ProbeOutcome::Skipped => &self.skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, peak_connections: usize) -> StatsSnapshot {
        StatsSnapshot {
            open: self.open.load(Ordering::Relaxed),
            closed: self.closed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            peak_connections,
        }
    }
}

/// A point-in-time copy of [`ScanStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub open: u64,
    pub closed: u64,
    pub timed_out: u64,
    pub cancelled: u64,
    pub skipped: u64,
    /// Highest number of simultaneous connection attempts.
    pub peak_connections: usize,
}

impl StatsSnapshot {
    /// Targets a connect was actually started for.
    pub fn probed(&self) -> u64 {
        self.open + self.closed + self.timed_out + self.cancelled
    }

    /// Targets handled in any way, including skipped ones.
    pub fn total(&self) -> u64 {
        self.probed() + self.skipped
    }
}
