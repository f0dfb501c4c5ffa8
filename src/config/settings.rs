//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and saved reports.

use super::limits;
use crate::error::{ConfigError, ConfigResult};
use crate::storage::ReportFormat;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/portsweep)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/portsweep)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Resolve the per-user XDG directories.
    pub fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "portsweep", "portsweep")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        })
    }

    /// Place both directories under a single root.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the default directory for scan reports.
    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir.join("reports")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Default number of concurrent scan jobs.
    pub default_tasks: usize,
    /// Default per-connect timeout in milliseconds.
    pub default_timeout_ms: u64,
    /// Default ceiling on in-flight connection attempts.
    pub default_max_connections: usize,
    /// Probe only the common ports unless told otherwise.
    pub quick_scan: bool,
    /// Save a report after every scan.
    pub auto_save_reports: bool,
    /// Format of saved reports.
    pub report_format: ReportFormat,
    /// Override for the report directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_tasks: limits::DEFAULT_TASKS,
            default_timeout_ms: limits::DEFAULT_TIMEOUT_MS,
            default_max_connections: limits::DEFAULT_MAX_CONNECTIONS,
            quick_scan: false,
            auto_save_reports: true,
            report_format: ReportFormat::Text,
            reports_dir: None,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, falling back to defaults.
    pub fn load(paths: &Paths) -> ConfigResult<Self> {
        let file = paths.settings_file();

        if !file.exists() {
            tracing::debug!(path = %file.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to the default location.
    pub fn save(&self, paths: &Paths) -> ConfigResult<PathBuf> {
        fs::create_dir_all(&paths.config_dir)?;
        let file = paths.settings_file();
        self.save_to(&file)?;
        Ok(file)
    }

    /// Save settings to a specific file.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Check that the stored defaults are within the accepted bounds.
    pub fn validate(&self) -> ConfigResult<()> {
        check_range(
            "default_tasks",
            self.default_tasks as u64,
            1,
            limits::MAX_TASKS as u64,
        )?;
        check_range(
            "default_timeout_ms",
            self.default_timeout_ms,
            limits::MIN_TIMEOUT_MS,
            limits::MAX_TIMEOUT_MS,
        )?;
        check_range(
            "default_max_connections",
            self.default_max_connections as u64,
            1,
            limits::MAX_CONNECTIONS as u64,
        )
    }

    /// Directory reports are written to.
    pub fn reports_dir(&self, paths: &Paths) -> PathBuf {
        self.reports_dir
            .clone()
            .unwrap_or_else(|| paths.reports_dir())
    }
}

/// Reject `value` unless it lies in `min..=max`.
pub(crate) fn check_range(field: &'static str, value: u64, min: u64, max: u64) -> ConfigResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
