//! CLI argument definitions.
//!
//! This module defines the top-level [`Cli`] struct and the [`Commands`]
//! enum. Each command group declares its own subcommands next to its
//! implementation in [`crate::cli::commands`].

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use super::commands::api::ApiArgs;
use super::commands::backup::BackupArgs;
use super::commands::db::DbArgs;
use super::commands::docker::DockerArgs;
use super::commands::git::GitArgs;
use super::commands::logs::LogsArgs;
use super::commands::network::NetArgs;
use super::commands::perf::PerfArgs;
use super::commands::process::ProcessArgs;
use super::commands::security::SecurityArgs;
use super::commands::system::SystemArgs;
use super::commands::text::TextArgs;

/// opskit - Everyday DevOps tasks behind one command.
#[derive(Debug, Parser)]
#[command(name = "opskit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to settings file (overrides ~/.opskit/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Audit log file (overrides the configured log file)
    #[arg(long, global = true, env = "OPSKIT_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Show verbose output, including the tools being run
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Answer yes to confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available command groups.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Host information: kernel, disks, memory, uptime
    System(SystemArgs),

    /// Analyze log files
    Logs(LogsArgs),

    /// Create, list, restore and rotate tar.gz backups
    Backup(BackupArgs),

    /// Inspect, signal and watch processes
    Process(ProcessArgs),

    /// Network checks: ping, ports, DNS
    Net(NetArgs),

    /// Docker container and image housekeeping
    Docker(DockerArgs),

    /// Git shortcuts for the current repository
    Git(GitArgs),

    /// Run queries against a saved MySQL/PostgreSQL connection
    Db(DbArgs),

    /// HTTP requests, health checks and test suites
    Api(ApiArgs),

    /// Local security audit
    Security(SecurityArgs),

    /// Performance snapshots and monitoring
    Perf(PerfArgs),

    /// Text file statistics, extraction and rewriting
    Text(TextArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Commands {
    /// `group sub` label used in the audit log.
    pub fn label(&self) -> String {
        let (group, sub) = match self {
            Self::System(a) => ("system", a.command.name()),
            Self::Logs(a) => ("logs", a.command.name()),
            Self::Backup(a) => ("backup", a.command.name()),
            Self::Process(a) => ("process", a.command.name()),
            Self::Net(a) => ("net", a.command.name()),
            Self::Docker(a) => ("docker", a.command.name()),
            Self::Git(a) => ("git", a.command.name()),
            Self::Db(a) => ("db", a.command.name()),
            Self::Api(a) => ("api", a.command.name()),
            Self::Security(a) => ("security", a.command.name()),
            Self::Perf(a) => ("perf", a.command.name()),
            Self::Text(a) => ("text", a.command.name()),
            Self::Completions(a) => return format!("completions {}", a.shell),
        };
        format!("{} {}", group, sub)
    }
}

/// Polling options shared by every `monitor` subcommand.
#[derive(Debug, Clone, Args)]
pub struct MonitorArgs {
    /// Seconds between probes (defaults to monitor.interval_secs)
    #[arg(short, long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Stop after this many probes (0 = until interrupted)
    #[arg(short = 'n', long, default_value_t = 0)]
    pub count: u64,
}

impl MonitorArgs {
    /// Probe limit, `None` when unbounded.
    pub fn max_probes(&self) -> Option<u64> {
        (self.count > 0).then_some(self.count)
    }
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Help for the first command group named in `args`, or the top-level help.
///
/// Printed after an unknown subcommand so the user sees every choice and
/// its positional parameters.
pub fn usage_for<S: AsRef<str>>(args: &[S]) -> String {
    let mut root = Cli::command();
    root.build();
    let group = args
        .iter()
        .skip(1)
        .find_map(|a| root.find_subcommand(a.as_ref()))
        .cloned();
    match group {
        Some(mut group) => group.render_help().to_string(),
        None => root.render_help().to_string(),
    }
}
