//! Append-only audit log.
//!
//! Every line has the shape `[%Y-%m-%d %H:%M:%S][LEVEL] message`. The file
//! is opened in append mode per write and never read back by opskit
//! itself.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

/// Severity of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Upper-case label written into the log line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format one audit line (without trailing newline).
pub fn format_line(timestamp: DateTime<Local>, level: LogLevel, message: &str) -> String {
    // Keep one entry per line even when a tool's diagnostic spans several.
    let message = message.replace(['\r', '\n'], " ");
    format!(
        "[{}][{}] {}",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        level,
        message.trim()
    )
}

/// Audit log backed by a single file.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Create a log writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<temp dir>/opskit.log`.
    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join("opskit.log")
    }

    /// Get the log path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry stamped with the current local time.
    pub fn append(&self, level: LogLevel, message: &str) -> Result<()> {
        self.append_at(Local::now(), level, message)
    }

    /// Append an entry with an explicit timestamp.
    pub fn append_at(
        &self,
        timestamp: DateTime<Local>,
        level: LogLevel,
        message: &str,
    ) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {:?}", self.path))?;

        writeln!(file, "{}", format_line(timestamp, level, message))?;
        Ok(())
    }

    /// Append an entry, downgrading write failures to a tracing warning.
    ///
    /// Auditing must never change the outcome of the command being audited.
    pub fn record(&self, level: LogLevel, message: &str) {
        if let Err(e) = self.append(level, message) {
            tracing::warn!("Could not write audit log {}: {:#}", self.path.display(), e);
        }
    }
}
