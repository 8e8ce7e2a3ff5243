//! Security scanning commands.
//!
//! Provides `opskit security ports`, `perms`, `users` and `ssh`.
//! `perms` and `ssh` fail when they find something; `ports` and `users`
//! only report.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::analysis::read_text;
use crate::analysis::security::{audit_sshd_config, parse_passwd, scan_permissions};
use crate::analysis::system::{parse_ss, ListeningSocket};
use crate::error::{OpsError, Result};
use crate::shell::{is_elevated, Invocation};
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

const DEFAULT_PASSWD: &str = "/etc/passwd";
const DEFAULT_SSHD_CONFIG: &str = "/etc/ssh/sshd_config";

/// Services that should not listen on every interface.
const RISKY_PORTS: &[(u16, &str)] = &[
    (21, "ftp"),
    (23, "telnet"),
    (111, "rpcbind"),
    (139, "netbios"),
    (445, "smb"),
    (2375, "docker api"),
    (3306, "mysql"),
    (3389, "rdp"),
    (5432, "postgres"),
    (5900, "vnc"),
    (6379, "redis"),
    (9200, "elasticsearch"),
    (11211, "memcached"),
    (27017, "mongodb"),
];

/// Arguments for the security command.
#[derive(Debug, Clone, Args)]
pub struct SecurityArgs {
    #[command(subcommand)]
    pub command: SecuritySubcommand,
}

/// Security subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum SecuritySubcommand {
    /// Listening sockets, flagging risky public services
    Ports,
    /// World-writable, setuid and setgid files under a directory
    Perms {
        /// Directory to scan
        dir: PathBuf,
    },
    /// Login-capable and root-equivalent accounts
    Users {
        /// passwd-format file
        #[arg(long, default_value = DEFAULT_PASSWD)]
        file: PathBuf,
    },
    /// Audit sshd settings
    Ssh {
        /// sshd configuration file
        #[arg(default_value = DEFAULT_SSHD_CONFIG)]
        config: PathBuf,
    },
}

impl SecuritySubcommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ports => "ports",
            Self::Perms { .. } => "perms",
            Self::Users { .. } => "users",
            Self::Ssh { .. } => "ssh",
        }
    }
}

/// Service name when `socket` exposes a risky port on every interface.
fn risky_service(socket: &ListeningSocket) -> Option<&'static str> {
    if !socket.is_public() {
        return None;
    }
    RISKY_PORTS
        .iter()
        .find(|(port, _)| *port == socket.port)
        .map(|(_, service)| *service)
}

/// The security command implementation.
pub struct SecurityCommand<'a> {
    ctx: &'a CommandContext,
    args: SecurityArgs,
}

impl<'a> SecurityCommand<'a> {
    pub fn new(ctx: &'a CommandContext, args: SecurityArgs) -> Self {
        Self { ctx, args }
    }

    fn ports(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let output = self
            .ctx
            .run_tool(ui, &self.ctx.bounded(Invocation::new("ss").arg("-tuln")))?;
        let sockets = parse_ss(&output.stdout);

        let mut table = Table::new(&["Proto", "Address", "Port", "Note"]);
        let mut risky = 0;
        for socket in &sockets {
            let note = match risky_service(socket) {
                Some(service) => {
                    risky += 1;
                    format!("{} exposed", service)
                }
                None if socket.is_public() => "public".to_string(),
                None => String::new(),
            };
            table.add_row([
                socket.protocol.clone(),
                socket.address.clone(),
                socket.port.to_string(),
                note,
            ]);
        }
        ui.show_header("Listening ports");
        ui.show_table(&table);

        if risky > 0 {
            ui.warning(&format!(
                "{} risky service(s) listening on all interfaces",
                risky
            ));
        }
        Ok(CommandResult::success(format!(
            "{} listening, {} risky",
            sockets.len(),
            risky
        )))
    }

    fn perms(&self, dir: &Path, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if !dir.is_dir() {
            return Err(OpsError::Precondition {
                path: dir.to_path_buf(),
                message: "Directory not found".to_string(),
            });
        }

        if !is_elevated() {
            ui.show_hint("Not running as root; unreadable entries are skipped.");
        }
        let mut spinner = ui.start_spinner(&format!("Scanning {}...", dir.display()));
        let findings = scan_permissions(dir);
        spinner.finish_clear();

        if findings.is_empty() {
            ui.success("No risky permissions found");
            return Ok(CommandResult::success(format!(
                "{}: no findings",
                dir.display()
            )));
        }

        let mut table = Table::new(&["Path", "Mode", "Issue"]);
        for finding in &findings {
            table.add_row([
                finding.path.display().to_string(),
                format!("{:04o}", finding.mode),
                finding.issue.label().to_string(),
            ]);
        }
        ui.show_header(&format!("Permission findings: {}", dir.display()));
        ui.show_table(&table);
        ui.warning(&format!("{} finding(s)", findings.len()));

        Ok(CommandResult::failure(
            1,
            format!("{}: {} finding(s)", dir.display(), findings.len()),
        ))
    }

    fn users(&self, file: &Path, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let accounts = parse_passwd(&read_text(file)?);
        let login: Vec<_> = accounts.iter().filter(|a| a.can_login()).collect();

        let mut table = Table::new(&["User", "UID", "Home", "Shell"]);
        for account in &login {
            table.add_row([
                account.name.clone(),
                account.uid.to_string(),
                account.home.clone(),
                account.shell.clone(),
            ]);
        }
        ui.show_header("Accounts with a login shell");
        ui.show_table(&table);

        let root_like: Vec<&str> = accounts
            .iter()
            .filter(|a| a.is_root_equivalent() && a.name != "root")
            .map(|a| a.name.as_str())
            .collect();
        if !root_like.is_empty() {
            ui.warning(&format!("UID 0 besides root: {}", root_like.join(", ")));
        }

        Ok(CommandResult::success(format!(
            "{} account(s), {} with login",
            accounts.len(),
            login.len()
        )))
    }

    fn ssh(&self, config: &Path, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let findings = audit_sshd_config(&read_text(config)?);

        ui.show_header(&format!("SSH audit: {}", config.display()));
        let mut failed = 0;
        for finding in &findings {
            let value = finding.value.as_deref().unwrap_or("(default)");
            if finding.ok {
                ui.success(&format!("{} {}", finding.key, value));
            } else {
                failed += 1;
                ui.warning(&format!("{} {}: {}", finding.key, value, finding.advice));
            }
        }

        Ok(CommandResult::from_check(
            failed == 0,
            format!("{} of {} setting(s) need attention", failed, findings.len()),
        ))
    }
}

impl Command for SecurityCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.command {
            SecuritySubcommand::Ports => self.ports(ui),
            SecuritySubcommand::Perms { dir } => self.perms(dir, ui),
            SecuritySubcommand::Users { file } => self.users(file, ui),
            SecuritySubcommand::Ssh { config } => self.ssh(config, ui),
        }
    }
}
