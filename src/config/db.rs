//! Saved database connection settings.
//!
//! Stored as `KEY=VALUE` in `~/.opskit/db.env`. The password is never
//! saved; it comes from `OPSKIT_DB_PASSWORD` at call time and reaches the
//! client through its own environment variable rather than argv.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{OpsError, Result};
use crate::shell::Invocation;

use super::env_file::EnvFileParser;

/// Environment variable holding the database password.
pub const PASSWORD_ENV: &str = "OPSKIT_DB_PASSWORD";

/// Supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Mysql,
    Postgres,
}

impl DbKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Postgres => "postgres",
        }
    }

    /// Interactive client binary.
    pub fn client(&self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Postgres => "psql",
        }
    }

    /// Dump tool binary.
    pub fn dump_tool(&self) -> &'static str {
        match self {
            Self::Mysql => "mysqldump",
            Self::Postgres => "pg_dump",
        }
    }

    /// Environment variable the client reads its password from.
    pub fn password_var(&self) -> &'static str {
        match self {
            Self::Mysql => "MYSQL_PWD",
            Self::Postgres => "PGPASSWORD",
        }
    }

    /// Statement listing the tables of the current database.
    pub fn list_tables_sql(&self) -> &'static str {
        match self {
            Self::Mysql => "SHOW TABLES;",
            Self::Postgres => concat!(
                "SELECT tablename FROM pg_catalog.pg_tables ",
                "WHERE schemaname NOT IN ('pg_catalog', 'information_schema') ",
                "ORDER BY tablename;"
            ),
        }
    }
}

impl fmt::Display for DbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::Mysql),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(format!(
                "unknown database type '{}' (expected mysql or postgres)",
                s
            )),
        }
    }
}

/// A saved database connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub kind: DbKind,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
}

impl DbConfig {
    /// Build from parsed `KEY=VALUE` pairs.
    pub fn from_vars(vars: &BTreeMap<String, String>, source: &Path) -> Result<Self> {
        let get = |key: &str| -> Result<String> {
            vars.get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| OpsError::ConfigParse {
                    path: source.to_path_buf(),
                    message: format!("missing {}", key),
                })
        };

        let parse_err = |message: String| OpsError::ConfigParse {
            path: source.to_path_buf(),
            message,
        };

        let kind = get("DB_KIND")?.parse::<DbKind>().map_err(parse_err)?;
        let port = get("DB_PORT")?
            .parse::<u16>()
            .map_err(|e| parse_err(format!("DB_PORT: {}", e)))?;

        Ok(Self {
            kind,
            host: get("DB_HOST")?,
            port,
            user: get("DB_USER")?,
            database: get("DB_NAME")?,
        })
    }

    /// Serialize to `KEY=VALUE` pairs.
    pub fn to_vars(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("DB_KIND".to_string(), self.kind.to_string());
        vars.insert("DB_HOST".to_string(), self.host.clone());
        vars.insert("DB_PORT".to_string(), self.port.to_string());
        vars.insert("DB_USER".to_string(), self.user.clone());
        vars.insert("DB_NAME".to_string(), self.database.clone());
        vars
    }

    /// Load from `path`; `Ok(None)` when nothing has been saved.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match EnvFileParser::load_optional(path)? {
            Some(vars) => Self::from_vars(&vars, path).map(Some),
            None => Ok(None),
        }
    }

    /// Persist to `path` with owner-only permissions.
    pub fn save(&self, path: &Path) -> Result<()> {
        EnvFileParser::save(path, &self.to_vars())?;
        Ok(())
    }

    /// Client invocation running one SQL statement.
    pub fn query(&self, sql: &str, password: Option<&str>, timeout: Duration) -> Invocation {
        self.with_password(self.client(sql, false), password).timeout(timeout)
    }

    /// Like [`query`](Self::query) but without headers or alignment, one
    /// row per line.
    pub fn query_rows(&self, sql: &str, password: Option<&str>, timeout: Duration) -> Invocation {
        self.with_password(self.client(sql, true), password).timeout(timeout)
    }

    fn client(&self, sql: &str, bare: bool) -> Invocation {
        let port = self.port.to_string();
        match self.kind {
            DbKind::Mysql => {
                let inv = Invocation::new(self.kind.client())
                    .args(["-h", &self.host, "-P", &port, "-u", &self.user]);
                let inv = if bare { inv.args(["-N", "-B"]) } else { inv };
                inv.arg(&self.database).args(["-e", sql])
            }
            DbKind::Postgres => {
                let inv = Invocation::new(self.kind.client())
                    .args(["-h", &self.host, "-p", &port, "-U", &self.user])
                    .args(["-d", &self.database, "-w"]);
                let inv = if bare { inv.args(["-t", "-A"]) } else { inv };
                inv.args(["-c", sql])
            }
        }
    }

    /// Dump invocation writing the whole database to `file`.
    pub fn dump(&self, file: &Path, password: Option<&str>) -> Invocation {
        let file = file.display().to_string();
        let inv = match self.kind {
            DbKind::Mysql => Invocation::new(self.kind.dump_tool())
                .args(["-h", &self.host])
                .args(["-P", &self.port.to_string()])
                .args(["-u", &self.user])
                .arg(format!("--result-file={}", file))
                .arg(&self.database),
            DbKind::Postgres => Invocation::new(self.kind.dump_tool())
                .args(["-h", &self.host])
                .args(["-p", &self.port.to_string()])
                .args(["-U", &self.user])
                .arg("-w")
                .args(["-f", &file])
                .arg(&self.database),
        };
        self.with_password(inv, password)
    }

    fn with_password(&self, inv: Invocation, password: Option<&str>) -> Invocation {
        match password {
            Some(pw) => inv.env(self.kind.password_var(), pw),
            None => inv,
        }
    }

    /// `user@host:port/database` for display.
    pub fn describe(&self) -> String {
        format!(
            "{} {}@{}:{}/{}",
            self.kind, self.user, self.host, self.port, self.database
        )
    }
}
