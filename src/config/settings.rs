//! Settings schema.
//!
//! Every field has a default, so an absent or partial settings file is
//! valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level settings, loaded once per invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Audit log path (defaults to `<temp dir>/opskit.log`).
    pub log_file: Option<PathBuf>,

    /// HTTP client settings.
    pub http: HttpSettings,

    /// Polling monitor settings.
    pub monitor: MonitorSettings,

    /// Backup settings.
    pub backup: BackupSettings,

    /// External tool settings.
    pub commands: CommandSettings,
}

impl Settings {
    /// Check values that parse but cannot work.
    pub fn validate(&self) -> Result<(), String> {
        if self.backup.max_backups == 0 {
            return Err("backup.max_backups must be at least 1".to_string());
        }
        if self.backup.prefix.trim().is_empty() {
            return Err("backup.prefix must not be empty".to_string());
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSettings {
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Polling monitor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorSettings {
    /// Seconds between probes when `--interval` is not given.
    pub interval_secs: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

/// Backup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackupSettings {
    /// Default destination directory (defaults to `~/backups`).
    pub destination: Option<PathBuf>,

    /// Archive name prefix.
    pub prefix: String,

    /// Archives kept after rotation (at least 1, so a new archive survives).
    pub max_backups: usize,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            destination: None,
            prefix: "backup".to_string(),
            max_backups: 5,
        }
    }
}

impl BackupSettings {
    /// Resolve the destination, falling back to `~/backups`.
    pub fn destination_dir(&self) -> PathBuf {
        self.destination.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("backups")
        })
    }
}

/// External tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommandSettings {
    /// Time budget for quick queries (listings, db queries, monitor pings).
    ///
    /// Long-running work such as dumps, pushes and prunes is not bounded.
    pub timeout_secs: u64,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl CommandSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
