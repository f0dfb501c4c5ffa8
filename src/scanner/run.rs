//! One scan job: a slice of addresses crossed with a slice of ports.

use super::context::ScanContext;
use super::probe::probe;
use futures::stream::{self, StreamExt};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::debug;

/// Which dimension a job iterates in its outer loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOrder {
    /// Every port of one address before moving to the next address.
    AddressMajor,
    /// Every address on one port before moving to the next port.
    PortMajor,
}

/// The work assigned to one concurrent job.
///
/// Address and port slices are shared behind `Arc`s so port-split jobs can
/// all reference the full address list without copying it.
#[derive(Debug, Clone)]
pub struct ScanRun {
    addresses: Arc<[Ipv4Addr]>,
    ports: Arc<[u16]>,
    order: IterationOrder,
}

impl ScanRun {
    /// A job owning an address chunk, probed against the shared port list.
    pub fn by_address(addresses: impl Into<Arc<[Ipv4Addr]>>, ports: Arc<[u16]>) -> Self {
        Self {
            addresses: addresses.into(),
            ports,
            order: IterationOrder::AddressMajor,
        }
    }

    /// A job owning a port chunk, probed across the shared address list.
    pub fn by_port(addresses: Arc<[Ipv4Addr]>, ports: impl Into<Arc<[u16]>>) -> Self {
        Self {
            addresses,
            ports: ports.into(),
            order: IterationOrder::PortMajor,
        }
    }

    pub fn addresses(&self) -> &[Ipv4Addr] {
        &self.addresses
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    pub fn order(&self) -> IterationOrder {
        self.order
    }

    /// Number of (address, port) pairs in this job.
    pub fn len(&self) -> usize {
        self.addresses.len() * self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every target of the job in attempt order.
    pub fn targets(&self) -> Box<dyn Iterator<Item = (Ipv4Addr, u16)> + Send + '_> {
        let addresses = &self.addresses[..];
        let ports = &self.ports[..];

        match self.order {
            IterationOrder::AddressMajor => Box::new(
                addresses
                    .iter()
                    .flat_map(move |&addr| ports.iter().map(move |&port| (addr, port))),
            ),
            IterationOrder::PortMajor => Box::new(
                ports
                    .iter()
                    .flat_map(move |&port| addresses.iter().map(move |&addr| (addr, port))),
            ),
        }
    }

    /// Probe every target, keeping at most `window` probes of this job in
    /// flight. Stops pulling new targets once the session is cancelled.
    pub async fn run(&self, ctx: &ScanContext, window: usize) {
        if ctx.cancel.is_cancelled() {
            debug!("job cancelled before start");
            return;
        }

        let cancel = &ctx.cancel;
        let targets = self.targets().take_while(move |_| !cancel.is_cancelled());

        stream::iter(targets)
            .for_each_concurrent(window.max(1), move |(addr, port)| async move {
                probe(ctx, addr, port).await;
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::admission::ConnectionBudget;
    use crate::scanner::probe::tests::{collecting_callback, FakeConnector};
    use std::net::SocketAddr;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn addrs(last: &[u8]) -> Vec<Ipv4Addr> {
        last.iter().map(|&o| Ipv4Addr::new(10, 0, 0, o)).collect()
    }

    #[test]
    fn test_address_major_order() {
        let run = ScanRun::by_address(addrs(&[1, 2]), Arc::from(vec![22u16, 80]));
        let targets: Vec<_> = run.targets().collect();
        assert_eq!(
            targets,
            vec![
                (Ipv4Addr::new(10, 0, 0, 1), 22),
                (Ipv4Addr::new(10, 0, 0, 1), 80),
                (Ipv4Addr::new(10, 0, 0, 2), 22),
                (Ipv4Addr::new(10, 0, 0, 2), 80),
            ]
        );
        assert_eq!(run.len(), 4);
    }

    #[test]
    fn test_port_major_order() {
        let run = ScanRun::by_port(Arc::from(addrs(&[1, 2])), vec![22u16, 80]);
        let targets: Vec<_> = run.targets().collect();
        assert_eq!(
            targets,
            vec![
                (Ipv4Addr::new(10, 0, 0, 1), 22),
                (Ipv4Addr::new(10, 0, 0, 2), 22),
                (Ipv4Addr::new(10, 0, 0, 1), 80),
                (Ipv4Addr::new(10, 0, 0, 2), 80),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_probes_every_target() {
        let open = SocketAddr::from((Ipv4Addr::new(10, 0, 0, 2), 443));
        let connector = Arc::new(FakeConnector::accepting([open], Duration::from_millis(1)));
        let (callback, found) = collecting_callback();
        let ctx = ScanContext::new(
            connector.clone(),
            Arc::new(ConnectionBudget::new(64)),
            Duration::from_secs(1),
            callback,
        );

        let run = ScanRun::by_address(addrs(&[1, 2, 3]), Arc::from(vec![22u16, 80, 443]));
        run.run(&ctx, 4).await;

        assert_eq!(connector.calls.load(Ordering::SeqCst), 9);
        assert!(connector.max_active.load(Ordering::SeqCst) <= 4);
        let found = found.lock().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].to_string(), "10.0.0.2:443 is open.");
        assert_eq!(ctx.stats().closed, 8);
    }

    #[tokio::test]
    async fn test_cancelled_job_does_nothing() {
        let connector = Arc::new(FakeConnector::accepting([], Duration::ZERO));
        let (callback, _) = collecting_callback();
        let ctx = ScanContext::new(
            connector.clone(),
            Arc::new(ConnectionBudget::new(64)),
            Duration::from_secs(1),
            callback,
        );
        ctx.cancel.cancel();

        ScanRun::by_address(addrs(&[1, 2]), Arc::from(vec![80u16]))
            .run(&ctx, 8)
            .await;

        assert_eq!(connector.calls.load(Ordering::SeqCst), 0);
    }
}
