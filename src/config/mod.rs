//! Configuration loading for opskit.
//!
//! Configuration is loaded once by the entry point and handed to every
//! command explicitly:
//! - Settings schema in [`settings`]
//! - File discovery and loading in [`loader`]
//! - Saved database connection in [`db`]
//! - `KEY=VALUE` dot-file handling in [`env_file`]
//!
//! # Example
//!
//! ```
//! use opskit::config::{load_settings, ConfigPaths};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let paths = ConfigPaths::in_dir(temp.path());
//! fs::write(&paths.settings, "backup:\n  max_backups: 3\n").unwrap();
//!
//! let settings = load_settings(&paths.settings, false).unwrap();
//! assert_eq!(settings.backup.max_backups, 3);
//! ```

pub mod db;
pub mod env_file;
pub mod loader;
pub mod settings;

pub use db::{DbConfig, DbKind, PASSWORD_ENV};
pub use env_file::EnvFileParser;
pub use loader::{load_db_config, load_settings, parse_settings, ConfigPaths};
pub use settings::{BackupSettings, CommandSettings, HttpSettings, MonitorSettings, Settings};
