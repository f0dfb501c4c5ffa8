//! Admission control for connection attempts.
//!
//! A [`ConnectionBudget`] caps how many connects a scan session has in
//! flight. Probes that find the budget full wait a fixed backoff and retry
//! until they get a slot or the session is cancelled.

use crate::config::limits::ADMISSION_BACKOFF;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Per-session counter of in-flight connection attempts with a ceiling.
///
/// The ceiling is advisory. [`ConnectionBudget::try_acquire`] reads the
/// counter and then increments it as two separate atomic steps, so callers
/// racing between the two can push the count past the ceiling by at most the
/// number of racers. That looseness is accepted; the budget throttles socket
/// creation rather than enforcing a strict limit.
#[derive(Debug)]
pub struct ConnectionBudget {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    ceiling: usize,
    backoff: Duration,
}

impl ConnectionBudget {
    /// Create a budget using the standard one second backoff.
    pub fn new(ceiling: usize) -> Self {
        Self::with_backoff(ceiling, ADMISSION_BACKOFF)
    }

    pub fn with_backoff(ceiling: usize, backoff: Duration) -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            ceiling,
            backoff,
        }
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Connection attempts currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Highest in-flight count observed so far.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }

    /// Claim a slot if the in-flight count is below the ceiling.
    pub fn try_acquire(&self) -> bool {
        if self.in_flight.load(Ordering::Relaxed) >= self.ceiling {
            return false;
        }

        let now = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak.fetch_max(now, Ordering::Relaxed);
        true
    }

    /// Return a slot. The counter saturates at zero.
    pub fn release(&self) {
        let _ = self
            .in_flight
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Wait for a slot, retrying after the backoff while the budget is full.
    ///
    /// Returns `None` once `cancel` fires. The returned guard releases the
    /// slot when dropped.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Option<BudgetSlot<'_>> {
        loop {
            if cancel.is_cancelled() {
                return None;
            }
            if self.try_acquire() {
                return Some(BudgetSlot { budget: self });
            }

            tracing::trace!(
                in_flight = self.in_flight(),
                ceiling = self.ceiling,
                "connection budget full, backing off"
            );

            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = tokio::time::sleep(self.backoff) => {}
            }
        }
    }
}

/// A claimed budget slot, released on drop.
#[derive(Debug)]
pub struct BudgetSlot<'a> {
    budget: &'a ConnectionBudget,
}

impl Drop for BudgetSlot<'_> {
    fn drop(&mut self) {
        self.budget.release();
    }
}
