//! Scan reports and their on-disk storage.
//!
//! Text reports hold one `host:port is open.` line per result. JSON reports
//! carry the full record and can be loaded back by scan ID.

use crate::error::{StorageError, StorageResult};
use crate::scanner::StatsSnapshot;
use crate::types::{OpenPort, PortSet, ScanId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

/// File format of a saved report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One line per open port.
    #[default]
    Text,
    /// The full record as JSON.
    Json,
}

/// The record of one finished (or stopped) scan session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Session that produced the report.
    pub id: ScanId,
    /// When the scan was started.
    pub started_at: DateTime<Utc>,
    /// When the scan finished or was drained after a stop.
    pub completed_at: DateTime<Utc>,
    /// Address specification as entered.
    pub address_spec: String,
    /// Port selection.
    pub ports: PortSet,
    /// Whether the scan was stopped early.
    pub cancelled: bool,
    /// Probe outcome counters.
    pub stats: StatsSnapshot,
    /// Open ports, ordered by address then port.
    pub open_ports: Vec<OpenPort>,
}

impl ScanReport {
    /// Begin a report for a session that is starting now.
    pub fn new(id: ScanId, address_spec: impl Into<String>, ports: PortSet) -> Self {
        let now = Utc::now();
        Self {
            id,
            started_at: now,
            completed_at: now,
            address_spec: address_spec.into(),
            ports,
            cancelled: false,
            stats: StatsSnapshot::default(),
            open_ports: Vec::new(),
        }
    }

    /// Fill in the results once the session has been joined.
    pub fn finalize(mut self, mut open_ports: Vec<OpenPort>, stats: StatsSnapshot, cancelled: bool) -> Self {
        open_ports.sort_by_key(|open| (open.host.parse::<Ipv4Addr>().ok(), open.port));

        self.completed_at = Utc::now();
        self.open_ports = open_ports;
        self.stats = stats;
        self.cancelled = cancelled;
        self
    }

    pub fn duration_ms(&self) -> u64 {
        (self.completed_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }

    /// Text report lines.
    pub fn to_lines(&self) -> Vec<String> {
        self.open_ports.iter().map(|open| open.to_string()).collect()
    }

    /// Get a short summary of the scan.
    pub fn summary(&self) -> String {
        format!(
            "{} [{}] - {} open of {} probed{} [{:.2}s]",
            self.address_spec,
            self.ports,
            self.open_ports.len(),
            self.stats.probed(),
            if self.cancelled { ", stopped" } else { "" },
            self.duration_ms() as f64 / 1000.0
        )
    }
}

/// Directory-backed report storage.
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    /// Open a store, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a report and return the file it was written to.
    pub fn save(&self, report: &ScanReport, format: ReportFormat) -> StorageResult<PathBuf> {
        let (path, content) = match format {
            ReportFormat::Text => {
                let mut content = report.to_lines().join("\n");
                content.push('\n');
                (self.text_path(report), content)
            }
            ReportFormat::Json => (
                self.json_path(&report.id),
                serde_json::to_string_pretty(report)?,
            ),
        };

        fs::write(&path, content).map_err(|e| StorageError::SaveFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), "report written");
        Ok(path)
    }

    /// Load a JSON report by scan ID.
    pub fn load(&self, id: &ScanId) -> StorageResult<ScanReport> {
        let path = self.json_path(id);
        let content =
            fs::read_to_string(&path).map_err(|e| StorageError::LoadFailed(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| StorageError::LoadFailed(e.to_string()))
    }

    fn text_path(&self, report: &ScanReport) -> PathBuf {
        self.dir.join(format!(
            "result_{}_{}.txt",
            report.completed_at.format("%Y%m%d_%H%M%S"),
            report.id.short()
        ))
    }

    fn json_path(&self, id: &ScanId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}
