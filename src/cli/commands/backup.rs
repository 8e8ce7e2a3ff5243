//! Backup commands.
//!
//! Provides `opskit backup create`, `list`, `restore` and `rotate`. Archives
//! are written by `tar`; listing and rotation happen in-process.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::{Args, Subcommand};

use crate::analysis::system::format_bytes;
use crate::backup::{create_archive, list_archives, restore_archive, rotate};
use crate::error::Result;
use crate::ui::{format_relative_time, Table, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// Arguments for the backup command.
#[derive(Debug, Clone, Args)]
pub struct BackupArgs {
    #[command(subcommand)]
    pub command: BackupSubcommand,
}

/// Backup subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum BackupSubcommand {
    /// Archive a file or directory, then rotate old archives
    Create {
        /// File or directory to back up
        source: PathBuf,
        /// Destination directory (defaults to backup.destination)
        dest: Option<PathBuf>,
    },
    /// List archives, newest first
    List {
        /// Destination directory (defaults to backup.destination)
        dest: Option<PathBuf>,
    },
    /// Extract an archive into a directory
    Restore {
        /// Archive to extract
        archive: PathBuf,
        /// Directory to extract into
        target: PathBuf,
    },
    /// Delete archives beyond backup.max_backups
    Rotate {
        /// Destination directory (defaults to backup.destination)
        dest: Option<PathBuf>,
    },
}

impl BackupSubcommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::List { .. } => "list",
            Self::Restore { .. } => "restore",
            Self::Rotate { .. } => "rotate",
        }
    }
}

/// The backup command implementation.
pub struct BackupCommand<'a> {
    ctx: &'a CommandContext,
    args: BackupArgs,
}

impl<'a> BackupCommand<'a> {
    pub fn new(ctx: &'a CommandContext, args: BackupArgs) -> Self {
        Self { ctx, args }
    }

    fn destination(&self, dest: Option<&Path>) -> PathBuf {
        dest.map(Path::to_path_buf)
            .unwrap_or_else(|| self.ctx.settings.backup.destination_dir())
    }

    fn create(
        &self,
        source: &Path,
        dest: Option<&Path>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let settings = &self.ctx.settings.backup;
        let dest = self.destination(dest);

        let mut spinner = ui.start_spinner(&format!("Backing up {}...", source.display()));
        let archive = match create_archive(
            self.ctx.runner.as_ref(),
            source,
            &dest,
            &settings.prefix,
            Local::now(),
        ) {
            Ok(path) => path,
            Err(e) => {
                spinner.finish_error("Backup failed");
                return Err(e);
            }
        };
        spinner.finish_success(&format!("Created {}", archive.display()));

        let rotation = rotate(&dest, &settings.prefix, settings.max_backups)?;
        for removed in &rotation.removed {
            ui.message(&format!("Removed old backup {}", removed.display()));
        }

        Ok(CommandResult::success(format!(
            "created {} ({} kept, {} removed)",
            archive.display(),
            rotation.kept.len(),
            rotation.removed.len()
        )))
    }

    fn list(&self, dest: Option<&Path>, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let dest = self.destination(dest);
        let archives = list_archives(&dest, &self.ctx.settings.backup.prefix)?;

        if archives.is_empty() {
            ui.message(&format!("No backups in {}", dest.display()));
            return Ok(CommandResult::success("0 backup(s)"));
        }

        let now = Local::now();
        let mut table = Table::new(&["Archive", "Size", "Created"]);
        for archive in &archives {
            let modified: DateTime<Local> = archive.modified.into();
            table.add_row([
                archive.file_name(),
                format_bytes(archive.size),
                format_relative_time(modified, now),
            ]);
        }
        ui.show_header(&format!("Backups in {}", dest.display()));
        ui.show_table(&table);

        Ok(CommandResult::success(format!("{} backup(s)", archives.len())))
    }

    fn restore(
        &self,
        archive: &Path,
        target: &Path,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        restore_archive(self.ctx.runner.as_ref(), archive, target)?;
        ui.success(&format!(
            "Restored {} into {}",
            archive.display(),
            target.display()
        ));
        Ok(CommandResult::success(format!(
            "restored {} into {}",
            archive.display(),
            target.display()
        )))
    }

    fn rotate(&self, dest: Option<&Path>, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = &self.ctx.settings.backup;
        let dest = self.destination(dest);
        let outcome = rotate(&dest, &settings.prefix, settings.max_backups)?;

        for removed in &outcome.removed {
            ui.message(&format!("Removed {}", removed.display()));
        }
        ui.success(&format!(
            "{} kept, {} removed (max {})",
            outcome.kept.len(),
            outcome.removed.len(),
            settings.max_backups
        ));

        Ok(CommandResult::success(format!(
            "{} kept, {} removed",
            outcome.kept.len(),
            outcome.removed.len()
        )))
    }
}

impl Command for BackupCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.command {
            BackupSubcommand::Create { source, dest } => self.create(source, dest.as_deref(), ui),
            BackupSubcommand::List { dest } => self.list(dest.as_deref(), ui),
            BackupSubcommand::Restore { archive, target } => self.restore(archive, target, ui),
            BackupSubcommand::Rotate { dest } => self.rotate(dest.as_deref(), ui),
        }
    }
}
