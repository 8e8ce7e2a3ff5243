//! Configuration file discovery and loading.
//!
//! All configuration lives under `~/.opskit/`:
//! - `config.yml`: [`Settings`] (optional)
//! - `db.env`: saved [`DbConfig`] (written by `opskit db configure`)

use crate::config::db::DbConfig;
use crate::config::settings::Settings;
use crate::error::{OpsError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Locations of the configuration files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Settings file.
    pub settings: PathBuf,

    /// Saved database connection.
    pub db: PathBuf,
}

impl ConfigPaths {
    /// Paths under `~/.opskit`, or `./.opskit` when there is no home directory.
    pub fn discover() -> Self {
        let base = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".opskit");
        Self::in_dir(&base)
    }

    /// Paths under an explicit directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            settings: dir.join("config.yml"),
            db: dir.join("db.env"),
        }
    }

    /// Replace the settings path (from `--config`).
    pub fn with_settings(mut self, path: Option<&Path>) -> Self {
        if let Some(path) = path {
            self.settings = path.to_path_buf();
        }
        self
    }
}

/// Parse YAML content into [`Settings`].
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_settings(content: &str, source_path: &Path) -> Result<Settings> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings: Settings =
        serde_yaml::from_str(content).map_err(|e| OpsError::ConfigParse {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;
    settings
        .validate()
        .map_err(|message| OpsError::ConfigParse {
            path: source_path.to_path_buf(),
            message,
        })?;
    Ok(settings)
}

/// Load settings from `path`.
///
/// A missing file yields defaults unless `required` is set (an explicit
/// `--config` that does not exist is a precondition error).
pub fn load_settings(path: &Path, required: bool) -> Result<Settings> {
    match fs::read_to_string(path) {
        Ok(content) => parse_settings(&content, path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(OpsError::Precondition {
                    path: path.to_path_buf(),
                    message: "Settings file not found".to_string(),
                })
            } else {
                tracing::debug!("No settings at {}, using defaults", path.display());
                Ok(Settings::default())
            }
        }
        Err(e) => Err(OpsError::Io(e)),
    }
}

/// Load the saved database connection, if any.
pub fn load_db_config(paths: &ConfigPaths) -> Result<Option<DbConfig>> {
    DbConfig::load(&paths.db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn in_dir_layout() {
        let paths = ConfigPaths::in_dir(Path::new("/home/u/.opskit"));
        assert_eq!(paths.settings, PathBuf::from("/home/u/.opskit/config.yml"));
        assert_eq!(paths.db, PathBuf::from("/home/u/.opskit/db.env"));
    }

    #[test]
    fn with_settings_overrides() {
        let paths =
            ConfigPaths::in_dir(Path::new("/x")).with_settings(Some(Path::new("/etc/ops.yml")));
        assert_eq!(paths.settings, PathBuf::from("/etc/ops.yml"));
        assert_eq!(paths.db, PathBuf::from("/x/db.env"));
    }

    #[test]
    fn missing_optional_settings_is_default() {
        let temp = TempDir::new().unwrap();
        let settings = load_settings(&temp.path().join("config.yml"), false).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn missing_required_settings_fails() {
        let temp = TempDir::new().unwrap();
        let err = load_settings(&temp.path().join("config.yml"), true).unwrap_err();
        assert!(matches!(err, OpsError::Precondition { .. }));
    }

    #[test]
    fn loads_settings_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "monitor:\n  interval_secs: 2\n").unwrap();

        let settings = load_settings(&path, true).unwrap();
        assert_eq!(settings.monitor.interval_secs, 2);
    }

    #[test]
    fn empty_file_is_default() {
        let settings = parse_settings("\n", Path::new("config.yml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn invalid_yaml_reports_path() {
        let err = parse_settings("http: [", Path::new("/cfg/config.yml")).unwrap_err();
        assert!(err.to_string().contains("/cfg/config.yml"));
    }

    #[test]
    fn zero_max_backups_is_rejected() {
        let err = parse_settings("backup:\n  max_backups: 0\n", Path::new("/cfg/config.yml"))
            .unwrap_err();
        assert!(matches!(err, OpsError::ConfigParse { .. }));
        assert!(err.to_string().contains("max_backups must be at least 1"));
    }
}
