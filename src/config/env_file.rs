//! `KEY=VALUE` dot-file parsing and writing.
//!
//! Saved database settings live in this format so they stay readable and
//! editable by hand.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Parses and writes `KEY=VALUE` files.
///
/// # Supported Formats
///
/// - Simple: `KEY=value`
/// - Quoted: `KEY="value with spaces"` or `KEY='single quoted'`
/// - Exported: `export KEY=value`
/// - Empty: `KEY=`
/// - Comments: `# This is a comment`
/// - Values with equals signs: `URL=https://example.com?foo=bar`
///
/// # Example
///
/// ```
/// use opskit::config::EnvFileParser;
///
/// let content = r#"
/// # Database
/// DB_HOST=localhost
/// DB_NAME="app db"
/// "#;
///
/// let vars = EnvFileParser::parse(content);
/// assert_eq!(vars.get("DB_HOST"), Some(&"localhost".to_string()));
/// assert_eq!(vars.get("DB_NAME"), Some(&"app db".to_string()));
/// ```
pub struct EnvFileParser;

impl EnvFileParser {
    /// Parse file content into an ordered map of variables.
    ///
    /// Lines without `=` are ignored; later duplicates win.
    pub fn parse(content: &str) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = Self::parse_line(line) {
                vars.insert(key, value);
            }
        }

        vars
    }

    fn parse_line(line: &str) -> Option<(String, String)> {
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = line.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), Self::unquote(value.trim())))
    }

    fn unquote(value: &str) -> String {
        let quoted = value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')));
        if quoted {
            value[1..value.len() - 1].to_string()
        } else {
            value.to_string()
        }
    }

    /// Render variables back to file content, quoting values with spaces.
    pub fn render(vars: &BTreeMap<String, String>) -> String {
        let mut out = String::new();
        for (key, value) in vars {
            if value.contains(char::is_whitespace) || value.contains('#') {
                out.push_str(&format!("{}=\"{}\"\n", key, value));
            } else {
                out.push_str(&format!("{}={}\n", key, value));
            }
        }
        out
    }

    /// Load and parse a file.
    pub fn load(path: &Path) -> Result<BTreeMap<String, String>> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        Ok(Self::parse(&content))
    }

    /// Load a file, returning `None` if it doesn't exist.
    pub fn load_optional(path: &Path) -> Result<Option<BTreeMap<String, String>>> {
        if path.exists() {
            Self::load(path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Write variables to `path`, readable only by the owner on unix.
    pub fn save(path: &Path, vars: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        fs::write(path, Self::render(vars)).with_context(|| format!("Failed to write {:?}", path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict permissions on {:?}", path))?;
        }

        Ok(())
    }
}
