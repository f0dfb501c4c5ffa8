//! Error types for portsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Individual probe
//! failures (timeouts, refusals, unreachable hosts) are outcomes, not errors,
//! and never appear here.

use crate::types::RangeError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised when starting or draining a scan session.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Input(#[from] RangeError),

    #[error("address range covers {count} addresses, more than the {max} a scan accepts")]
    TooManyAddresses { count: usize, max: usize },

    #[error("scan job failed: {0}")]
    JobFailed(String),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors from settings and scan configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a home directory for configuration")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from report persistence.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("report directory error: {0}")]
    DirectoryError(String),

    #[error("failed to save report {path}: {reason}")]
    SaveFailed { path: PathBuf, reason: String },

    #[error("failed to load report: {0}")]
    LoadFailed(String),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Top-level error for command handlers.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for command handlers.
pub type CliResult<T> = Result<T, CliError>;
