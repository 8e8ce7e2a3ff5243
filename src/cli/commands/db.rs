//! Database commands.
//!
//! Provides `opskit db configure`, `test`, `query`, `tables` and `dump`.
//! `configure` saves the connection to `~/.opskit/db.env`; every other
//! subcommand needs it and shells out to the engine's own client.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::{Args, Subcommand};

use crate::config::{DbConfig, DbKind};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};
use super::non_empty;

/// Arguments for the db command.
#[derive(Debug, Clone, Args)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbSubcommand,
}

/// Database subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum DbSubcommand {
    /// Save connection settings
    Configure {
        /// Engine: mysql or postgres
        kind: DbKind,
        /// Server host
        #[arg(value_parser = non_empty())]
        host: String,
        /// Server port
        #[arg(value_parser = clap::value_parser!(u16).range(1..))]
        port: u16,
        /// User name
        #[arg(value_parser = non_empty())]
        user: String,
        /// Database name
        #[arg(value_parser = non_empty())]
        database: String,
    },
    /// Check that the database answers
    Test,
    /// Run one SQL statement
    Query {
        /// SQL to execute
        #[arg(value_parser = non_empty())]
        sql: String,
    },
    /// List tables
    Tables,
    /// Dump the database to a file
    Dump {
        /// Output file (default: <database>_<timestamp>.sql)
        file: Option<PathBuf>,
    },
}

impl DbSubcommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configure { .. } => "configure",
            Self::Test => "test",
            Self::Query { .. } => "query",
            Self::Tables => "tables",
            Self::Dump { .. } => "dump",
        }
    }
}

/// The db command implementation.
pub struct DbCommand<'a> {
    ctx: &'a CommandContext,
    args: DbArgs,
}

impl<'a> DbCommand<'a> {
    pub fn new(ctx: &'a CommandContext, args: DbArgs) -> Self {
        Self { ctx, args }
    }

    fn password(&self) -> Option<&str> {
        self.ctx.db_password.as_deref()
    }

    fn configure(&self, db: DbConfig, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        db.save(&self.ctx.paths.db)?;
        tracing::debug!("Saved database settings to {}", self.ctx.paths.db.display());

        ui.success(&format!("Saved {}", db.describe()));
        if self.ctx.db_password.is_none() {
            ui.show_hint(&format!(
                "Set {} to pass the password to the client.",
                crate::config::PASSWORD_ENV
            ));
        }
        Ok(CommandResult::success(format!("configured {}", db.describe())))
    }

    fn test(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let db = self.ctx.require_db()?;
        let inv = db.query("SELECT 1;", self.password(), self.ctx.settings.commands.timeout());

        let mut spinner = ui.start_spinner(&format!("Connecting to {}...", db.describe()));
        let output = self.ctx.probe_tool(ui, &inv)?;
        if output.success {
            spinner.finish_success("Connection successful");
            Ok(CommandResult::success(format!("connected to {}", db.describe())))
        } else {
            spinner.finish_error("Connection failed");
            let detail = output.diagnostic().to_string();
            if !detail.is_empty() {
                ui.error(&detail);
            }
            Ok(CommandResult::failure(
                output.exit_code.unwrap_or(1).clamp(1, 255),
                format!("cannot connect to {}", db.describe()),
            ))
        }
    }

    fn query(&self, sql: &str, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let db = self.ctx.require_db()?;
        let inv = db.query(sql, self.password(), self.ctx.settings.commands.timeout());
        let output = self.ctx.run_tool(ui, &inv)?;

        for line in output.stdout.lines() {
            ui.message(line);
        }
        Ok(CommandResult::success(format!("query on {}", db.database)))
    }

    fn tables(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let db = self.ctx.require_db()?;
        let inv = db.query_rows(
            db.kind.list_tables_sql(),
            self.password(),
            self.ctx.settings.commands.timeout(),
        );
        let output = self.ctx.run_tool(ui, &inv)?;

        let tables: Vec<&str> = output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        ui.show_header(&format!("Tables in {}", db.database));
        for table in &tables {
            ui.message(table);
        }
        if tables.is_empty() {
            ui.warning("No tables found");
        }
        Ok(CommandResult::success(format!("{} table(s)", tables.len())))
    }

    fn dump(&self, file: Option<&Path>, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let db = self.ctx.require_db()?;
        let file = match file {
            Some(f) => f.to_path_buf(),
            None => self.ctx.cwd.join(format!(
                "{}_{}.sql",
                db.database,
                Local::now().format("%Y%m%d_%H%M%S")
            )),
        };
        // Dumps run as long as the server needs; only queries are bounded.
        let inv = db.dump(&file, self.password());

        let mut spinner = ui.start_spinner(&format!("Dumping {}...", db.database));
        if let Err(e) = self.ctx.run_tool(ui, &inv) {
            spinner.finish_error("Dump failed");
            if file.exists() {
                if let Err(rm) = fs::remove_file(&file) {
                    tracing::warn!("Could not remove partial dump {}: {}", file.display(), rm);
                }
            }
            return Err(e);
        }
        spinner.finish_success(&format!("Dumped to {}", file.display()));

        Ok(CommandResult::success(format!(
            "dumped {} to {}",
            db.database,
            file.display()
        )))
    }
}

impl Command for DbCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.command {
            DbSubcommand::Configure {
                kind,
                host,
                port,
                user,
                database,
            } => self.configure(
                DbConfig {
                    kind: *kind,
                    host: host.clone(),
                    port: *port,
                    user: user.clone(),
                    database: database.clone(),
                },
                ui,
            ),
            DbSubcommand::Test => self.test(ui),
            DbSubcommand::Query { sql } => self.query(sql, ui),
            DbSubcommand::Tables => self.tables(ui),
            DbSubcommand::Dump { file } => self.dump(file.as_deref(), ui),
        }
    }
}
