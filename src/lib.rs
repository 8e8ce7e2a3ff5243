//! opskit - everyday DevOps tasks behind one command.
//!
//! opskit wraps the system tools operators reach for (`df`, `ps`, `tar`,
//! `docker`, `git`, database clients) and a few in-process analyzers
//! behind one consistently-behaving CLI. Every invocation writes one line
//! to an audit log.
//!
//! # Modules
//!
//! - [`analysis`] - Log, text, system and security parsing
//! - [`audit`] - Append-only audit log
//! - [`backup`] - tar.gz archive creation, restore and rotation
//! - [`cli`] - Command-line interface and command groups
//! - [`config`] - Settings and saved database connection
//! - [`error`] - Error types and result aliases
//! - [`http`] - Blocking HTTP client for API commands
//! - [`monitor`] - Interval polling with Ctrl-C handling
//! - [`shell`] - External tool execution
//! - [`suite`] - Pipe-delimited API test suites
//! - [`ui`] - Terminal output, prompts and spinners
//!
//! # Example
//!
//! ```
//! use opskit::analysis::logs::summarize;
//!
//! let summary = summarize("INFO start\nERROR disk full\nWARN retrying\n");
//! assert_eq!(summary.errors, 1);
//! assert_eq!(summary.warnings, 1);
//! ```

pub mod analysis;
pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod monitor;
pub mod shell;
pub mod suite;
pub mod ui;

pub use error::{OpsError, Result};
