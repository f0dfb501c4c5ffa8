//! Single-target TCP connect probe.
//!
//! Performs a standard TCP connect through the operating system's socket
//! API. Nothing but a completed handshake counts as open: refusals,
//! unreachable hosts and timeouts are all reported as not open.

use super::context::ScanContext;
use crate::types::OpenPort;
use async_trait::async_trait;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Establishes a connection to a target.
///
/// The seam between the scheduler and the network; tests substitute
/// in-memory implementations.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to `addr` and close the connection again.
    async fn connect(&self, addr: SocketAddr) -> io::Result<()>;
}

/// Connector backed by `tokio::net::TcpStream`.
///
/// Does not require elevated privileges.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, addr: SocketAddr) -> io::Result<()> {
        let stream = TcpStream::connect(addr).await?;
        drop(stream);
        Ok(())
    }
}

/// How a single probe ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The connection completed; the callback was invoked.
    Open,
    /// The connect failed (refused, unreachable, reset).
    Closed,
    /// No answer within the timeout.
    TimedOut,
    /// Cancellation arrived while the connect was in flight.
    Cancelled,
    /// The session was cancelled before a connect was started.
    Skipped,
}

/// Probe `addr:port` under the session's timeout, budget and cancellation.
///
/// Reports an open port through the context's callback unless the session
/// was cancelled meanwhile. Failures are never surfaced as errors.
pub async fn probe(ctx: &ScanContext, addr: Ipv4Addr, port: u16) -> ProbeOutcome {
    let outcome = attempt(ctx, addr, port).await;
    ctx.stats.record(outcome);
    outcome
}

async fn attempt(ctx: &ScanContext, addr: Ipv4Addr, port: u16) -> ProbeOutcome {
    if ctx.cancel.is_cancelled() {
        return ProbeOutcome::Skipped;
    }

    let Some(_slot) = ctx.budget.acquire(&ctx.cancel).await else {
        return ProbeOutcome::Skipped;
    };

    let target = SocketAddr::from((addr, port));
    trace!(%target, "connecting");

    tokio::select! {
        biased;

        _ = ctx.cancel.cancelled() => {
            trace!(%target, "abandoned on cancellation");
            ProbeOutcome::Cancelled
        }
        result = timeout(ctx.timeout, ctx.connector.connect(target)) => match result {
            // A result that lands together with cancellation is dropped.
            Ok(Ok(())) if ctx.cancel.is_cancelled() => ProbeOutcome::Cancelled,
            Ok(Ok(())) => {
                trace!(%target, "open");
                (ctx.on_open)(OpenPort::new(addr, port));
                ProbeOutcome::Open
            }
            Ok(Err(e)) => {
                trace!(%target, error = %e, "not open");
                ProbeOutcome::Closed
            }
            Err(_) => {
                trace!(%target, "timed out");
                ProbeOutcome::TimedOut
            }
        },
    }
}
