//! Error types for opskit operations.
//!
//! This module defines [`OpsError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `OpsError` for failures a user can act on (bad input, missing
//!   files or tools, a delegated tool exiting non-zero)
//! - Use `anyhow::Error` (via `OpsError::Other`) inside leaf helpers that
//!   only need context strings
//! - Nothing is retried: every error terminates the current invocation

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for opskit operations.
#[derive(Debug, Error)]
pub enum OpsError {
    /// An argument was present but unusable.
    #[error("Invalid argument '{argument}': {message}")]
    Usage { argument: String, message: String },

    /// A file or directory the command depends on is absent.
    #[error("{message}: {path}")]
    Precondition { path: PathBuf, message: String },

    /// A host name did not resolve to any address.
    #[error("Cannot resolve '{host}': {message}")]
    Resolve { host: String, message: String },

    /// The external tool could not be found on PATH.
    #[error("Required tool '{tool}' is not installed or not on PATH")]
    ToolNotFound { tool: String },

    /// External tool exited non-zero.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// External tool exceeded its time budget and was killed.
    #[error("Command timed out after {seconds}s: {command}")]
    Timeout { command: String, seconds: u64 },

    /// Failed to parse a settings or data file.
    #[error("Failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// A command needs configuration that has not been saved yet.
    #[error("{what} is not configured. {hint}")]
    NotConfigured { what: String, hint: String },

    /// HTTP transport error (connection refused, timeout, invalid URL).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OpsError {
    /// Exit code the process should terminate with for this error.
    ///
    /// Delegated tool failures propagate the tool's own non-zero code;
    /// everything else exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CommandFailed {
                code: Some(code), ..
            } if (1..=255).contains(code) => *code,
            _ => 1,
        }
    }
}

/// Result type alias for opskit operations.
pub type Result<T> = std::result::Result<T, OpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_error_displays_argument_and_message() {
        let err = OpsError::Usage {
            argument: "port".into(),
            message: "must be a number".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("port"));
        assert!(msg.contains("must be a number"));
    }

    #[test]
    fn resolve_error_names_host() {
        let err = OpsError::Resolve {
            host: "db.internal".into(),
            message: "Name or service not known".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot resolve 'db.internal': Name or service not known"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn precondition_displays_path() {
        let err = OpsError::Precondition {
            path: PathBuf::from("/var/log/app.log"),
            message: "File not found".into(),
        };
        assert_eq!(err.to_string(), "File not found: /var/log/app.log");
    }

    #[test]
    fn tool_not_found_displays_tool() {
        let err = OpsError::ToolNotFound {
            tool: "docker".into(),
        };
        assert!(err.to_string().contains("docker"));
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = OpsError::CommandFailed {
            command: "git pull".into(),
            code: Some(128),
            stderr: "fatal: not a git repository".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("git pull"));
        assert!(msg.contains("128"));
    }

    #[test]
    fn timeout_displays_seconds() {
        let err = OpsError::Timeout {
            command: "ping -c 4 host".into(),
            seconds: 10,
        };
        assert!(err.to_string().contains("10s"));
    }

    #[test]
    fn not_configured_displays_hint() {
        let err = OpsError::NotConfigured {
            what: "Database".into(),
            hint: "Run 'opskit db configure' first.".into(),
        };
        assert_eq!(
            err.to_string(),
            "Database is not configured. Run 'opskit db configure' first."
        );
    }

    #[test]
    fn exit_code_propagates_tool_code() {
        let err = OpsError::CommandFailed {
            command: "docker ps".into(),
            code: Some(125),
            stderr: String::new(),
        };
        assert_eq!(err.exit_code(), 125);
    }

    #[test]
    fn exit_code_defaults_to_one() {
        let signalled = OpsError::CommandFailed {
            command: "sleep 100".into(),
            code: None,
            stderr: String::new(),
        };
        assert_eq!(signalled.exit_code(), 1);

        let io: OpsError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(io.exit_code(), 1);
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: OpsError = io_err.into();
        assert!(matches!(err, OpsError::Io(_)));
    }
}
