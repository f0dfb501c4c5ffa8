//! Scan subcommand implementation.
//!
//! Handles the `portsweep scan <spec>` command.

use crate::cli::OutputFormat;
use crate::config::{AppSettings, Paths};
use crate::error::CliResult;
use crate::output;
use crate::scanner::{self, ScanConfig, ScanContext};
use crate::storage::{ReportFormat, ReportStore, ResultCollector, ScanReport};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

const PROGRESS_REFRESH: Duration = Duration::from_millis(250);

/// Scan an address range for open ports.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Address range to scan
    ///
    /// Examples:
    ///   192.168.1.0/24       CIDR block (/16 or /24)
    ///   10.0.0.1-50          Dashed octet range
    #[arg(value_name = "SPEC")]
    pub spec: String,

    /// Probe only the common service ports
    #[arg(long)]
    pub quick: bool,

    /// Number of concurrent scan jobs
    #[arg(short = 'c', long)]
    pub tasks: Option<usize>,

    /// Connection timeout in milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Maximum number of simultaneous connection attempts
    #[arg(short = 'm', long)]
    pub max_connections: Option<usize>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Don't save a report
    #[arg(long)]
    pub no_save: bool,

    /// Format of the saved report
    #[arg(long, value_enum)]
    pub report_format: Option<ReportFormat>,

    /// Directory for saved reports
    #[arg(long, value_name = "DIR")]
    pub reports_dir: Option<PathBuf>,
}

impl ScanCommand {
    /// Build the session configuration: stored settings, then flags.
    pub fn scan_config(&self, settings: &AppSettings) -> ScanConfig {
        let mut config = ScanConfig::from_settings(&self.spec, settings);
        if self.quick {
            config = config.with_quick_scan(true);
        }
        if let Some(tasks) = self.tasks {
            config = config.with_tasks(tasks);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(Duration::from_millis(timeout));
        }
        if let Some(max_connections) = self.max_connections {
            config = config.with_max_connections(max_connections);
        }
        config
    }

    /// Execute the scan command.
    pub async fn execute(&self, settings: &AppSettings, paths: &Paths, quiet: bool) -> CliResult<()> {
        let config = self.scan_config(settings);
        config.validate()?;

        // Live output only for plain text, to keep JSON/CSV parseable
        let live = !quiet && self.output == OutputFormat::Plain;
        let collector = ResultCollector::new();
        let progress = live.then(new_progress_bar);

        let on_open = match &progress {
            Some(pb) => {
                let pb = pb.clone();
                collector.callback_with(move |open| pb.println(output::open_port_line(open)))
            }
            None => collector.callback(),
        };

        let mut handle = scanner::start_with_connector(
            config,
            Arc::new(scanner::TcpConnector),
            on_open,
        )?;
        let report = ScanReport::new(handle.id(), &self.spec, handle.ports());

        if live {
            output::print_scan_header(handle.id(), handle.range(), handle.ports(), handle.jobs());
        }

        let ticker = progress.as_ref().map(|pb| {
            pb.set_length(handle.total_targets());
            spawn_progress(pb.clone(), handle.context())
        });

        let cancel = handle.cancel_token();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, stopping scan");
                cancel.cancel();
            }
        });

        let joined = handle.join().await;
        interrupt.abort();
        if let Some(ticker) = ticker {
            ticker.abort();
        }
        if let Some(pb) = &progress {
            pb.finish_and_clear();
        }
        let stats = joined?;

        let report = report.finalize(collector.snapshot(), stats, handle.is_cancelled());

        if report.cancelled && !quiet {
            output::print_warning("Scan stopped before completion; results are partial.");
        }

        if !self.no_save && settings.auto_save_reports {
            let dir = self
                .reports_dir
                .clone()
                .unwrap_or_else(|| settings.reports_dir(paths));
            let format = self.report_format.unwrap_or(settings.report_format);
            let path = ReportStore::new(dir)?.save(&report, format)?;

            if live {
                output::print_info(&format!("Report saved to {}", path.display()));
            }
        }

        output::print_results(&report, self.output)?;

        Ok(())
    }
}

fn new_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn spawn_progress(pb: ProgressBar, ctx: Arc<ScanContext>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PROGRESS_REFRESH);
        loop {
            interval.tick().await;
            let stats = ctx.stats();
            pb.set_position(stats.total());
            pb.set_message(format!("{} open", stats.open));
        }
    })
}
