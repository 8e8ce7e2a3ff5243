//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandContext`] carrying the configuration loaded by `main`
//! - [`CommandDispatcher`] for routing CLI subcommands and auditing them

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::audit::{AuditLog, LogLevel};
use crate::cli::args::{Cli, Commands, MonitorArgs};
use crate::config::{ConfigPaths, DbConfig, Settings};
use crate::error::{OpsError, Result};
use crate::monitor::{run_monitor, status_line, ProbeStatus, StopSignal, Ticker};
use crate::shell::{CommandOutput, Invocation, SystemRunner, ToolRunner};
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand group implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure, exit code and a
    /// one-line summary for the audit log.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,

    /// One-line outcome written to the audit log.
    pub summary: String,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success(summary: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: 0,
            summary: summary.into(),
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32, summary: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code,
            summary: summary.into(),
        }
    }

    /// Success or exit-1 failure depending on `ok`.
    pub fn from_check(ok: bool, summary: impl Into<String>) -> Self {
        if ok {
            Self::success(summary)
        } else {
            Self::failure(1, summary)
        }
    }
}

/// Everything a command needs from the environment.
///
/// Built once by `main` and passed to every command explicitly.
pub struct CommandContext {
    pub settings: Settings,
    pub paths: ConfigPaths,
    /// Saved database connection, if `db configure` has run.
    pub db: Option<DbConfig>,
    /// Database password from the environment.
    pub db_password: Option<String>,
    pub runner: Arc<dyn ToolRunner>,
    pub audit: AuditLog,
    /// Skip confirmation prompts (`--yes`).
    pub assume_yes: bool,
    /// Working directory for git and generated reports.
    pub cwd: PathBuf,
    /// Root of the procfs mount.
    pub proc_root: PathBuf,
    stop: StopSignal,
    watch_interrupt: bool,
}

impl CommandContext {
    /// Context with default paths and a real process runner.
    pub fn new(settings: Settings, paths: ConfigPaths) -> Self {
        let audit = AuditLog::new(
            settings
                .log_file
                .clone()
                .unwrap_or_else(AuditLog::default_path),
        );
        Self {
            settings,
            paths,
            db: None,
            db_password: None,
            runner: Arc::new(SystemRunner),
            audit,
            assume_yes: false,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            proc_root: PathBuf::from("/proc"),
            stop: StopSignal::new(),
            watch_interrupt: false,
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn ToolRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_db(mut self, db: Option<DbConfig>, password: Option<String>) -> Self {
        self.db = db;
        self.db_password = password;
        self
    }

    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self
    }

    /// Let Ctrl-C stop monitors instead of killing the process.
    pub fn with_interrupts(mut self, watch: bool) -> Self {
        self.watch_interrupt = watch;
        self
    }

    /// Stop signal handed to monitors.
    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Ticker for a monitor; `interval_secs` overrides the configured default.
    pub fn ticker(&self, interval_secs: Option<u64>) -> Ticker {
        let secs = interval_secs.unwrap_or(self.settings.monitor.interval_secs);
        let stop = if self.watch_interrupt {
            StopSignal::interruptible()
        } else {
            self.stop.clone()
        };
        Ticker::new(Duration::from_secs(secs), stop)
    }

    /// Saved database connection or a `NotConfigured` error.
    pub fn require_db(&self) -> Result<&DbConfig> {
        self.db.as_ref().ok_or_else(|| OpsError::NotConfigured {
            what: "Database".to_string(),
            hint: "Run 'opskit db configure <kind> <host> <port> <user> <database>' first."
                .to_string(),
        })
    }

    /// Cap a quick query at the configured command timeout.
    ///
    /// Invocations that are not bounded this way run until the tool exits.
    pub fn bounded(&self, invocation: Invocation) -> Invocation {
        invocation.timeout(self.settings.commands.timeout())
    }

    /// Run a tool and require a zero exit.
    pub fn run_tool(
        &self,
        ui: &mut dyn UserInterface,
        invocation: &Invocation,
    ) -> Result<CommandOutput> {
        let output = self.probe_tool(ui, invocation)?;
        output.into_result(invocation)
    }

    /// Run a tool and return its output whatever the exit code.
    pub fn probe_tool(
        &self,
        ui: &mut dyn UserInterface,
        invocation: &Invocation,
    ) -> Result<CommandOutput> {
        if ui.output_mode().shows_commands() {
            ui.message(&format!("$ {}", invocation.display()));
        }
        self.run_quiet(invocation)
    }

    /// Like [`probe_tool`](Self::probe_tool) without echoing the command.
    pub fn run_quiet(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.runner.run(invocation)
    }

    /// Poll `probe` until the probe limit or Ctrl-C, printing one status
    /// line per probe.
    ///
    /// Succeeds when the last probe was healthy (or none ran).
    pub fn watch<P>(
        &self,
        ui: &mut dyn UserInterface,
        target: &str,
        args: &MonitorArgs,
        probe: P,
    ) -> CommandResult
    where
        P: FnMut() -> ProbeStatus,
    {
        let ticker = self.ticker(args.interval);
        ui.show_header(&format!(
            "Monitoring {} every {}s",
            target,
            ticker.interval().as_secs()
        ));
        if args.max_probes().is_none() && ui.is_interactive() {
            ui.show_hint("Press Ctrl-C to stop");
        }

        let summary = run_monitor(&ticker, args.max_probes(), probe, |_, at, status| {
            ui.message(&status_line(at, target, status));
        });

        ui.show_field("Probes", &summary.probes.to_string());
        ui.show_field("Failures", &summary.failures.to_string());
        if let Some(last) = &summary.last {
            ui.show_field("Last status", &last.detail);
        }

        let healthy = summary.last.as_ref().map_or(true, |s| s.healthy);
        CommandResult::from_check(healthy, format!("{}: {}", target, summary.describe()))
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    context: CommandContext,
}

impl CommandDispatcher {
    pub fn new(context: CommandContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    /// Dispatch and execute a command.
    ///
    /// Exactly one audit line is written per call: INFO when the command
    /// succeeds, ERROR when it fails or returns an error.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let label = cli.command.label();
        tracing::debug!("Dispatching '{}'", label);

        let result = self.route(&cli.command, ui);

        match &result {
            Ok(r) if r.success => {
                self.context
                    .audit
                    .record(LogLevel::Info, &format!("{}: {}", label, r.summary));
            }
            Ok(r) => {
                self.context.audit.record(
                    LogLevel::Error,
                    &format!("{}: {} (exit {})", label, r.summary, r.exit_code),
                );
            }
            Err(e) => {
                self.context
                    .audit
                    .record(LogLevel::Error, &format!("{}: {}", label, e));
            }
        }

        result
    }

    fn route(&self, command: &Commands, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = &self.context;
        match command {
            Commands::System(args) => {
                let cmd = super::system::SystemCommand::new(ctx, args.clone());
                cmd.execute(ui)
            }
            Commands::Logs(args) => {
                let cmd = super::logs::LogsCommand::new(args.clone());
                cmd.execute(ui)
            }
            Commands::Backup(args) => {
                let cmd = super::backup::BackupCommand::new(ctx, args.clone());
                cmd.execute(ui)
            }
            Commands::Process(args) => {
                let cmd = super::process::ProcessCommand::new(ctx, args.clone());
                cmd.execute(ui)
            }
            Commands::Net(args) => {
                let cmd = super::network::NetCommand::new(ctx, args.clone());
                cmd.execute(ui)
            }
            Commands::Docker(args) => {
                let cmd = super::docker::DockerCommand::new(ctx, args.clone());
                cmd.execute(ui)
            }
            Commands::Git(args) => {
                let cmd = super::git::GitCommand::new(ctx, args.clone());
                cmd.execute(ui)
            }
            Commands::Db(args) => {
                let cmd = super::db::DbCommand::new(ctx, args.clone());
                cmd.execute(ui)
            }
            Commands::Api(args) => {
                let cmd = super::api::ApiCommand::new(ctx, args.clone());
                cmd.execute(ui)
            }
            Commands::Security(args) => {
                let cmd = super::security::SecurityCommand::new(ctx, args.clone());
                cmd.execute(ui)
            }
            Commands::Perf(args) => {
                let cmd = super::perf::PerfCommand::new(ctx, args.clone());
                cmd.execute(ui)
            }
            Commands::Text(args) => {
                let cmd = super::text::TextCommand::new(args.clone());
                cmd.execute(ui)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::context;
    use super::*;
    use crate::ui::MockUI;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn audit_lines(temp: &TempDir) -> Vec<String> {
        fs::read_to_string(temp.path().join("audit.log"))
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn command_result_success() {
        let result = CommandResult::success("ok");
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(3, "bad");
        assert!(!result.success);
        assert_eq!(result.exit_code, 3);
    }

    #[test]
    fn successful_dispatch_writes_one_info_line() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("notes.txt");
        fs::write(&file, "one two\n").unwrap();
        let (ctx, _) = context(&temp);
        let dispatcher = CommandDispatcher::new(ctx);
        let cli = Cli::parse_from(["opskit", "text", "stats", file.to_str().unwrap()]);

        let result = dispatcher.dispatch(&cli, &mut MockUI::new()).unwrap();

        assert!(result.success);
        let lines = audit_lines(&temp);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[INFO] text stats:"));
    }

    #[test]
    fn failed_dispatch_writes_one_error_line() {
        let temp = TempDir::new().unwrap();
        let (ctx, runner) = context(&temp);
        let dispatcher = CommandDispatcher::new(ctx);
        let missing = temp.path().join("missing.log");
        let cli = Cli::parse_from(["opskit", "logs", "summary", missing.to_str().unwrap()]);

        let result = dispatcher.dispatch(&cli, &mut MockUI::new());

        assert!(matches!(result, Err(OpsError::Precondition { .. })));
        assert!(!runner.was_invoked());
        let lines = audit_lines(&temp);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[ERROR] logs summary: File not found"));
    }

    #[test]
    fn tool_failure_is_audited_as_error() {
        let temp = TempDir::new().unwrap();
        let (ctx, runner) = context(&temp);
        runner.push_output(CommandOutput::failure(Some(128), "fatal: not a git repository"));
        let dispatcher = CommandDispatcher::new(ctx);
        let cli = Cli::parse_from(["opskit", "git", "status"]);

        let err = dispatcher.dispatch(&cli, &mut MockUI::new()).unwrap_err();

        assert_eq!(err.exit_code(), 128);
        let lines = audit_lines(&temp);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[ERROR] git status:"));
    }

    #[test]
    fn tool_runs_keep_invocation_timeout() {
        let temp = TempDir::new().unwrap();
        let (ctx, runner) = context(&temp);
        let mut ui = MockUI::new();

        ctx.probe_tool(&mut ui, &Invocation::new("tar")).unwrap();
        ctx.probe_tool(&mut ui, &ctx.bounded(Invocation::new("uname")))
            .unwrap();

        let invocations = runner.invocations();
        assert_eq!(invocations[0].timeout, None);
        assert_eq!(
            invocations[1].timeout,
            Some(ctx.settings.commands.timeout())
        );
    }

    #[test]
    fn verbose_mode_echoes_invocation() {
        let temp = TempDir::new().unwrap();
        let (ctx, _) = context(&temp);
        let mut ui = MockUI::with_mode(crate::ui::OutputMode::Verbose);

        ctx.run_tool(&mut ui, &Invocation::new("df").arg("-P")).unwrap();

        assert!(ui.has_message("$ df -P"));
    }

    #[test]
    fn unbounded_watch_hints_how_to_stop() {
        let temp = TempDir::new().unwrap();
        let (ctx, _) = context(&temp);
        let mut ui = MockUI::new();
        ui.set_interactive(true);
        let args = MonitorArgs {
            interval: Some(0),
            count: 0,
        };

        let result = ctx.watch(&mut ui, "svc", &args, || {
            ctx.stop_signal().trigger();
            ProbeStatus::up("ok")
        });

        assert!(result.success);
        assert_eq!(ui.hints(), &["Press Ctrl-C to stop"]);
        assert_eq!(ui.field("Probes"), Some("1"));
    }

    #[test]
    fn bounded_watch_has_no_stop_hint() {
        let temp = TempDir::new().unwrap();
        let (ctx, _) = context(&temp);
        let mut ui = MockUI::new();
        ui.set_interactive(true);
        let args = MonitorArgs {
            interval: Some(0),
            count: 2,
        };

        let result = ctx.watch(&mut ui, "svc", &args, || ProbeStatus::down("refused"));

        assert!(!result.success);
        assert!(ui.hints().is_empty());
        assert_eq!(ui.field("Failures"), Some("2"));
        assert!(ui.messages()[1].contains("svc DOWN - refused"));
    }

    #[test]
    fn require_db_reports_not_configured() {
        let temp = TempDir::new().unwrap();
        let (ctx, _) = context(&temp);

        let err = ctx.require_db().unwrap_err();
        assert!(err.to_string().contains("db configure"));
    }
}
