//! Work partitioning and job supervision.
//!
//! The address list is split across the requested number of jobs when there
//! are more addresses than jobs. Otherwise splitting by address would leave
//! jobs idle, so the port list is split instead and every port-chunk job
//! scans all addresses.

use super::context::ScanContext;
use super::run::ScanRun;
use crate::error::{ScanError, ScanResult};
use crate::types::PortSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};

/// Split the scan into jobs.
///
/// With `N` addresses and `T` tasks: if `N > T`, the addresses form `T`
/// chunks of `N / T` (the last chunk takes the remainder), each scanned
/// against the whole port set. Otherwise the ports form `T / N` chunks of
/// at least one port, each scanned across every address.
pub fn partition(addresses: Vec<Ipv4Addr>, ports: PortSet, tasks: usize) -> Vec<ScanRun> {
    let tasks = tasks.max(1);
    let count = addresses.len();
    if count == 0 {
        return Vec::new();
    }

    if count > tasks {
        let ports: Arc<[u16]> = ports.to_ports().into();
        let chunks = split_chunks(&addresses, tasks);
        debug!(
            jobs = chunks.len(),
            chunk_size = count / tasks,
            "partitioning by address"
        );
        chunks
            .into_iter()
            .map(|chunk| ScanRun::by_address(chunk, Arc::clone(&ports)))
            .collect()
    } else {
        let port_tasks = tasks / count;
        let addresses: Arc<[Ipv4Addr]> = addresses.into();
        let chunks = split_chunks(&ports.to_ports(), port_tasks);
        debug!(
            jobs = chunks.len(),
            port_tasks,
            "fewer addresses than tasks, partitioning by port"
        );
        chunks
            .into_iter()
            .map(|chunk| ScanRun::by_port(Arc::clone(&addresses), chunk))
            .collect()
    }
}

/// Split `items` into at most `parts` chunks of `len / parts` items (at
/// least one); the final chunk absorbs the remainder.
fn split_chunks<T: Clone>(items: &[T], parts: usize) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }

    let parts = parts.clamp(1, items.len());
    let size = items.len() / parts;

    (0..parts)
        .map(|i| {
            let start = i * size;
            let end = if i + 1 == parts { items.len() } else { start + size };
            items[start..end].to_vec()
        })
        .collect()
}

/// In-flight probe window per job: the connection ceiling shared evenly.
fn job_window(ceiling: usize, jobs: usize) -> usize {
    ceiling.div_ceil(jobs.max(1)).max(1)
}

/// Spawns one task per job and tracks them until they are joined.
pub struct ScanExecutor {
    tasks: usize,
    ctx: Arc<ScanContext>,
    running: Vec<JoinHandle<()>>,
}

impl ScanExecutor {
    pub fn new(tasks: usize, ctx: Arc<ScanContext>) -> Self {
        debug!(tasks, "creating executor");
        Self {
            tasks,
            ctx,
            running: Vec::with_capacity(tasks),
        }
    }

    /// Partition the work and spawn a task per job. Returns the number of
    /// jobs spawned.
    ///
    /// Must be called within a tokio runtime.
    pub fn build(&mut self, addresses: Vec<Ipv4Addr>, ports: PortSet) -> usize {
        let runs = partition(addresses, ports, self.tasks);
        let window = job_window(self.ctx.budget.ceiling(), runs.len());
        let mut spawned = 0;

        for (index, run) in runs.into_iter().enumerate() {
            if self.ctx.cancel.is_cancelled() {
                debug!(spawned, "cancelled while spawning jobs");
                break;
            }

            let ctx = Arc::clone(&self.ctx);
            let span = tracing::debug_span!("job", index, targets = run.len());
            let handle = tokio::spawn(
                async move {
                    run.run(&ctx, window).await;
                    debug!("job finished");
                }
                .instrument(span),
            );
            self.running.push(handle);
            spawned += 1;
        }

        debug!(jobs = spawned, window, "jobs spawned");
        spawned
    }

    /// Number of jobs still running. Finished handles are pruned.
    pub fn running_tasks(&mut self) -> usize {
        self.running.retain(|handle| !handle.is_finished());
        self.running.len()
    }

    /// Signal cancellation to every job. Follow with
    /// [`ScanExecutor::await_all`] to drain them.
    pub fn cancel_all(&self) {
        if !self.ctx.cancel.is_cancelled() {
            info!("cancelling all scan jobs");
        }
        self.ctx.cancel.cancel();
    }

    /// Wait for every spawned job to finish.
    pub async fn await_all(&mut self) -> ScanResult<()> {
        let handles = std::mem::take(&mut self.running);
        let mut failure = None;

        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                warn!(error = %e, "scan job did not complete");
                failure.get_or_insert_with(|| e.to_string());
            }
        }

        match failure {
            Some(reason) => Err(ScanError::JobFailed(reason)),
            None => Ok(()),
        }
    }
}
