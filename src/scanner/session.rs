//! Scan sessions: configuration, start-up and the stop/join handle.

use super::admission::ConnectionBudget;
use super::context::{OnOpenPort, ScanContext, StatsSnapshot};
use super::executor::ScanExecutor;
use super::probe::{Connector, TcpConnector};
use crate::config::{check_range, limits, AppSettings};
use crate::error::{ConfigResult, ScanError, ScanResult};
use crate::types::{AddressRange, OpenPort, PortSet, ScanId};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Configuration for one scan session.
///
/// [`ScanConfig::validate`] checks the numeric bounds; callers are expected
/// to run it before [`start`]. The address specification is always parsed
/// by `start` itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Address range in CIDR or dashed notation.
    pub address_spec: String,
    /// Probe only the common ports.
    pub quick_scan: bool,
    /// Number of concurrent jobs.
    pub tasks: usize,
    /// Per-connect timeout.
    pub timeout: Duration,
    /// Ceiling on in-flight connection attempts.
    pub max_connections: usize,
    /// Wait between admission attempts while the budget is full.
    pub admission_backoff: Duration,
}

impl ScanConfig {
    /// Create a configuration with default limits.
    pub fn new(address_spec: impl Into<String>) -> Self {
        Self {
            address_spec: address_spec.into(),
            quick_scan: false,
            tasks: limits::DEFAULT_TASKS,
            timeout: Duration::from_millis(limits::DEFAULT_TIMEOUT_MS),
            max_connections: limits::DEFAULT_MAX_CONNECTIONS,
            admission_backoff: limits::ADMISSION_BACKOFF,
        }
    }

    /// Create a configuration from the stored defaults.
    pub fn from_settings(address_spec: impl Into<String>, settings: &AppSettings) -> Self {
        Self::new(address_spec)
            .with_quick_scan(settings.quick_scan)
            .with_tasks(settings.default_tasks)
            .with_timeout(Duration::from_millis(settings.default_timeout_ms))
            .with_max_connections(settings.default_max_connections)
    }

    pub fn with_quick_scan(mut self, quick_scan: bool) -> Self {
        self.quick_scan = quick_scan;
        self
    }

    pub fn with_tasks(mut self, tasks: usize) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_admission_backoff(mut self, backoff: Duration) -> Self {
        self.admission_backoff = backoff;
        self
    }

    /// Ports every address is probed on.
    pub fn port_set(&self) -> PortSet {
        PortSet::from_quick(self.quick_scan)
    }

    /// Check timeout, task count and connection ceiling against the limits.
    pub fn validate(&self) -> ConfigResult<()> {
        check_range(
            "timeout (ms)",
            self.timeout.as_millis() as u64,
            limits::MIN_TIMEOUT_MS,
            limits::MAX_TIMEOUT_MS,
        )?;
        check_range("tasks", self.tasks as u64, 1, limits::MAX_TASKS as u64)?;
        check_range(
            "max connections",
            self.max_connections as u64,
            1,
            limits::MAX_CONNECTIONS as u64,
        )
    }
}

/// Start a scan session using real TCP connects.
///
/// Parses the address specification, partitions the work and spawns the
/// jobs. `on_open` is called once per open port, possibly from several
/// threads at once. Must be called within a tokio runtime.
pub fn start<F>(config: ScanConfig, on_open: F) -> ScanResult<ScanHandle>
where
    F: Fn(OpenPort) + Send + Sync + 'static,
{
    start_with_connector(config, Arc::new(TcpConnector), Arc::new(on_open))
}

/// Start a scan session with a custom [`Connector`].
pub fn start_with_connector(
    config: ScanConfig,
    connector: Arc<dyn Connector>,
    on_open: OnOpenPort,
) -> ScanResult<ScanHandle> {
    let range = AddressRange::parse(&config.address_spec)?;
    if range.len() > limits::MAX_ADDRESSES {
        return Err(ScanError::TooManyAddresses {
            count: range.len(),
            max: limits::MAX_ADDRESSES,
        });
    }
    let ports = config.port_set();
    let id = ScanId::new();

    let budget = Arc::new(ConnectionBudget::with_backoff(
        config.max_connections,
        config.admission_backoff,
    ));
    let ctx = Arc::new(ScanContext::new(connector, budget, config.timeout, on_open));

    let span = tracing::info_span!("scan", id = %id.short());
    let _guard = span.enter();

    let addresses = range.all_addresses();
    info!(
        %range,
        addresses = addresses.len(),
        %ports,
        tasks = config.tasks,
        timeout_ms = config.timeout.as_millis() as u64,
        max_connections = config.max_connections,
        "starting scan"
    );

    let mut executor = ScanExecutor::new(config.tasks, Arc::clone(&ctx));
    let jobs = executor.build(addresses, ports);

    Ok(ScanHandle {
        id,
        range,
        ports,
        jobs,
        executor,
        ctx,
        started: Instant::now(),
        finished: false,
        span: span.clone(),
    })
}

/// Control surface of a running scan session.
///
/// Dropping the handle cancels the session without waiting for it.
pub struct ScanHandle {
    id: ScanId,
    range: AddressRange,
    ports: PortSet,
    jobs: usize,
    executor: ScanExecutor,
    ctx: Arc<ScanContext>,
    started: Instant,
    finished: bool,
    span: tracing::Span,
}

impl ScanHandle {
    pub fn id(&self) -> ScanId {
        self.id
    }

    pub fn range(&self) -> &AddressRange {
        &self.range
    }

    pub fn ports(&self) -> PortSet {
        self.ports
    }

    /// Number of jobs spawned for this session.
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Jobs that have not finished yet.
    pub fn running_jobs(&mut self) -> usize {
        self.executor.running_tasks()
    }

    /// A clone of the session's cancellation token.
    ///
    /// Cancelling it has the same effect as [`ScanHandle::stop`] minus the
    /// draining; follow up with [`ScanHandle::join`].
    pub fn cancel_token(&self) -> CancellationToken {
        self.ctx.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.ctx.cancel.is_cancelled()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.ctx.stats()
    }

    /// Shared session state, for observers that outlive a borrow of the
    /// handle (progress reporting while [`ScanHandle::join`] runs).
    pub fn context(&self) -> Arc<ScanContext> {
        Arc::clone(&self.ctx)
    }

    /// Number of (address, port) targets in the session.
    pub fn total_targets(&self) -> u64 {
        self.range.len() as u64 * self.ports.len() as u64
    }

    /// Request cancellation and wait until every job has drained.
    ///
    /// Idempotent. Once it returns no further callbacks are delivered.
    pub async fn stop(&mut self) -> ScanResult<StatsSnapshot> {
        {
            let _guard = self.span.enter();
            self.executor.cancel_all();
        }
        self.join().await
    }

    /// Wait until every job has finished, or drained after a stop.
    pub async fn join(&mut self) -> ScanResult<StatsSnapshot> {
        self.executor.await_all().await?;

        let stats = self.stats();
        if !self.finished {
            self.finished = true;
            let _guard = self.span.enter();
            info!(
                open = stats.open,
                probed = stats.probed(),
                cancelled = self.is_cancelled(),
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                "scan finished"
            );
        }
        Ok(stats)
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        self.ctx.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, ScanError};
    use crate::scanner::probe::tests::{collecting_callback, FakeConnector};
    use crate::types::{RangeError, COMMON_PORTS};
    use std::net::{Ipv4Addr, SocketAddr};
    use std::sync::atomic::Ordering;
    use tokio::net::TcpListener;

    #[test]
    fn test_config_defaults_are_valid() {
        let config = ScanConfig::new("10.0.0.0/24");
        assert!(config.validate().is_ok());
        assert_eq!(config.port_set(), PortSet::Full);
    }

    #[test]
    fn test_config_bounds() {
        let base = ScanConfig::new("10.0.0.0/24");

        assert!(base.clone().with_timeout(Duration::from_millis(100)).validate().is_ok());
        assert!(base.clone().with_timeout(Duration::from_millis(8000)).validate().is_ok());
        assert!(matches!(
            base.clone().with_timeout(Duration::from_millis(99)).validate(),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(base.clone().with_timeout(Duration::from_millis(8001)).validate().is_err());
        assert!(base.clone().with_tasks(0).validate().is_err());
        assert!(base.clone().with_tasks(4001).validate().is_err());
        assert!(base.clone().with_max_connections(0).validate().is_err());
        assert!(base.clone().with_max_connections(20_000).validate().is_ok());
        assert!(base.with_max_connections(20_001).validate().is_err());
    }

    #[test]
    fn test_config_from_settings() {
        let settings = AppSettings {
            default_tasks: 12,
            default_timeout_ms: 300,
            quick_scan: true,
            ..AppSettings::default()
        };
        let config = ScanConfig::from_settings("127.0.0.1", &settings);
        assert_eq!(config.tasks, 12);
        assert_eq!(config.timeout, Duration::from_millis(300));
        assert_eq!(config.port_set(), PortSet::Common);
    }

    #[tokio::test]
    async fn test_start_rejects_bad_spec() {
        for (spec, expected) in [
            ("", RangeError::Empty),
            ("   ", RangeError::Empty),
            ("invalidIp", RangeError::InvalidFormat("invalidIp".to_string())),
            ("1.1.1.1/24", RangeError::NotSubnetBase("1.1.1.1/24".to_string())),
        ] {
            match start(ScanConfig::new(spec), |_| {}) {
                Err(ScanError::Input(e)) => assert_eq!(e, expected),
                Err(e) => panic!("unexpected error for {:?}: {}", spec, e),
                Ok(_) => panic!("{:?} should be rejected", spec),
            }
        }
    }

    #[tokio::test]
    async fn test_start_rejects_oversized_range() {
        let connector = Arc::new(FakeConnector::hanging());
        let (callback, _) = collecting_callback();

        let result = start_with_connector(
            ScanConfig::new("0-255.0-255.0-255.0-255").with_quick_scan(true),
            connector.clone(),
            callback,
        );

        match result {
            Err(ScanError::TooManyAddresses { count, max }) => {
                assert_eq!(count, 1usize << 32);
                assert_eq!(max, limits::MAX_ADDRESSES);
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("oversized range should be rejected"),
        }
        assert_eq!(connector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_quick_scan_reports_only_listening_port() {
        let open = SocketAddr::from((Ipv4Addr::LOCALHOST, 8080));
        let connector = Arc::new(FakeConnector::accepting([open], Duration::from_millis(1)));
        let (callback, found) = collecting_callback();

        let config = ScanConfig::new("127.0.0.1-1")
            .with_quick_scan(true)
            .with_tasks(4)
            .with_timeout(Duration::from_millis(500));
        let mut handle = start_with_connector(config, connector.clone(), callback).unwrap();
        assert_eq!(handle.jobs(), 4);

        let stats = handle.join().await.unwrap();

        assert_eq!(
            *found.lock().unwrap(),
            vec![OpenPort {
                host: "127.0.0.1".to_string(),
                port: 8080
            }]
        );
        assert_eq!(connector.calls.load(Ordering::SeqCst), COMMON_PORTS.len());
        assert_eq!(stats.open, 1);
        assert_eq!(stats.closed, 14);
    }

    #[tokio::test]
    async fn test_loopback_quick_scan() {
        // Skip quietly when something else already owns 8080.
        let Ok(listener) = TcpListener::bind("127.0.0.1:8080").await else {
            eprintln!("port 8080 busy, skipping loopback scan");
            return;
        };

        let (callback, found) = collecting_callback();
        let config = ScanConfig::new("127.0.0.1-1")
            .with_quick_scan(true)
            .with_tasks(8)
            .with_timeout(Duration::from_millis(1000));
        let mut handle = start_with_connector(config, Arc::new(TcpConnector), callback).unwrap();
        handle.join().await.unwrap();
        drop(listener);

        let found = found.lock().unwrap();
        assert!(found.contains(&OpenPort::new(Ipv4Addr::LOCALHOST, 8080)));
        assert!(found
            .iter()
            .all(|open| open.host == "127.0.0.1" && COMMON_PORTS.contains(&open.port)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_callbacks_after_stop() {
        let everything: Vec<SocketAddr> = AddressRange::parse("10.0.0.0/24")
            .unwrap()
            .all_addresses()
            .into_iter()
            .flat_map(|addr| COMMON_PORTS.iter().map(move |&port| SocketAddr::from((addr, port))))
            .collect();
        let connector = Arc::new(FakeConnector::accepting(everything, Duration::from_millis(5)));
        let (callback, found) = collecting_callback();

        let config = ScanConfig::new("10.0.0.0/24")
            .with_quick_scan(true)
            .with_tasks(8)
            .with_max_connections(16);
        let mut handle = start_with_connector(config, connector, callback).unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        let stats = handle.stop().await.unwrap();
        let delivered = found.lock().unwrap().len();

        assert!(handle.is_cancelled());
        assert_eq!(handle.running_jobs(), 0);
        assert!((delivered as u64) < 256 * 15);
        assert_eq!(stats.open, delivered as u64);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(found.lock().unwrap().len(), delivered);

        // A second stop is a no-op.
        handle.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_connection_ceiling_holds() {
        const CEILING: usize = 6;
        const TASKS: usize = 12;

        let connector = Arc::new(FakeConnector::accepting([], Duration::from_millis(10)));
        let (callback, _) = collecting_callback();
        let config = ScanConfig::new("10.0.0.0-47")
            .with_quick_scan(true)
            .with_tasks(TASKS)
            .with_max_connections(CEILING)
            .with_admission_backoff(Duration::from_millis(5));

        let mut handle = start_with_connector(config, connector.clone(), callback).unwrap();
        let stats = handle.join().await.unwrap();

        assert_eq!(stats.closed, 48 * 15);
        assert!(stats.peak_connections <= CEILING + TASKS);
        assert!(connector.max_active.load(Ordering::SeqCst) <= CEILING + TASKS);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let connector = Arc::new(FakeConnector::hanging());
        let (callback, _) = collecting_callback();
        let config = ScanConfig::new("10.0.0.1").with_quick_scan(true).with_tasks(2);

        let mut first = start_with_connector(config.clone(), connector.clone(), callback.clone()).unwrap();
        let mut second = start_with_connector(config, connector, callback).unwrap();
        assert_ne!(first.id(), second.id());

        first.stop().await.unwrap();
        assert!(!second.is_cancelled());
        second.stop().await.unwrap();
    }
}
