//! Process commands.
//!
//! Provides `opskit process list`, `check`, `kill` and `monitor`, backed by
//! `ps`, `pgrep` and `kill`.

use clap::{Args, Subcommand};

use crate::analysis::system::parse_ps;
use crate::cli::args::MonitorArgs;
use crate::error::Result;
use crate::monitor::ProbeStatus;
use crate::shell::{CommandOutput, Invocation};
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};
use super::non_empty;

/// Arguments for the process command.
#[derive(Debug, Clone, Args)]
pub struct ProcessArgs {
    #[command(subcommand)]
    pub command: ProcessSubcommand,
}

/// Process subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum ProcessSubcommand {
    /// Processes sorted by CPU usage
    List {
        /// How many processes to show
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Whether a process with this exact name is running
    Check {
        /// Process name
        #[arg(value_parser = non_empty())]
        name: String,
    },
    /// Send a signal to a process
    Kill {
        /// Process id
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        pid: u32,
        /// Signal name or number
        #[arg(short, long, default_value = "TERM", value_parser = non_empty())]
        signal: String,
    },
    /// Check a process repeatedly
    Monitor {
        /// Process name
        #[arg(value_parser = non_empty())]
        name: String,
        #[command(flatten)]
        watch: MonitorArgs,
    },
}

impl ProcessSubcommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Check { .. } => "check",
            Self::Kill { .. } => "kill",
            Self::Monitor { .. } => "monitor",
        }
    }
}

/// `pgrep` outcome for one name.
enum Lookup {
    Running(Vec<String>),
    NotRunning,
}

fn pgrep(name: &str) -> Invocation {
    Invocation::new("pgrep").args(["-x", name])
}

/// Interpret `pgrep`: exit 0 lists pids, exit 1 means no match, anything
/// else is a real failure.
fn lookup(invocation: &Invocation, output: CommandOutput) -> Result<Lookup> {
    match output.exit_code {
        Some(0) => Ok(Lookup::Running(
            output.stdout.split_whitespace().map(String::from).collect(),
        )),
        Some(1) => Ok(Lookup::NotRunning),
        _ => output.into_result(invocation).map(|_| Lookup::NotRunning),
    }
}

/// The process command implementation.
pub struct ProcessCommand<'a> {
    ctx: &'a CommandContext,
    args: ProcessArgs,
}

impl<'a> ProcessCommand<'a> {
    pub fn new(ctx: &'a CommandContext, args: ProcessArgs) -> Self {
        Self { ctx, args }
    }

    fn list(&self, top: usize, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let inv = self.ctx.bounded(
            Invocation::new("ps").args(["-eo", "pid,user,%cpu,%mem,comm", "--sort=-%cpu"]),
        );
        let output = self.ctx.run_tool(ui, &inv)?;
        let rows = parse_ps(&output.stdout);

        let mut table = Table::new(&["PID", "User", "CPU%", "MEM%", "Command"]);
        for row in rows.iter().take(top) {
            table.add_row([
                row.pid.to_string(),
                row.user.clone(),
                format!("{:.1}", row.cpu),
                format!("{:.1}", row.mem),
                row.command.clone(),
            ]);
        }
        ui.show_header("Top processes by CPU");
        ui.show_table(&table);

        Ok(CommandResult::success(format!(
            "{} of {} process(es)",
            table.row_count(),
            rows.len()
        )))
    }

    fn check(&self, name: &str, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let inv = self.ctx.bounded(pgrep(name));
        let output = self.ctx.probe_tool(ui, &inv)?;

        match lookup(&inv, output)? {
            Lookup::Running(pids) => {
                ui.success(&format!("{} is running (PID {})", name, pids.join(", ")));
                Ok(CommandResult::success(format!(
                    "{} running, {} process(es)",
                    name,
                    pids.len()
                )))
            }
            Lookup::NotRunning => {
                ui.error(&format!("{} is not running", name));
                Ok(CommandResult::failure(1, format!("{} not running", name)))
            }
        }
    }

    fn kill(&self, pid: u32, signal: &str, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let question = format!("Send SIG{} to {}?", signal, pid);
        if !self.ctx.assume_yes && !ui.confirm(&question, false)? {
            ui.message("Cancelled");
            return Ok(CommandResult::success("cancelled"));
        }

        let inv = self
            .ctx
            .bounded(Invocation::new("kill").args(["-s", signal, &pid.to_string()]));
        self.ctx.run_tool(ui, &inv)?;
        ui.success(&format!("Sent SIG{} to {}", signal, pid));

        Ok(CommandResult::success(format!("sent {} to {}", signal, pid)))
    }

    fn monitor(
        &self,
        name: &str,
        watch: &MonitorArgs,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let ctx = self.ctx;
        let inv = ctx.bounded(pgrep(name));
        let probe = || {
            let looked_up = ctx
                .run_quiet(&inv)
                .and_then(|output| lookup(&inv, output));
            match looked_up {
                Ok(Lookup::Running(pids)) => ProbeStatus::up(format!("PID {}", pids.join(", "))),
                Ok(Lookup::NotRunning) => ProbeStatus::down("not running"),
                Err(e) => ProbeStatus::down(e.to_string()),
            }
        };
        Ok(ctx.watch(ui, name, watch, probe))
    }
}

impl Command for ProcessCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.command {
            ProcessSubcommand::List { top } => self.list(*top, ui),
            ProcessSubcommand::Check { name } => self.check(name, ui),
            ProcessSubcommand::Kill { pid, signal } => self.kill(*pid, signal, ui),
            ProcessSubcommand::Monitor { name, watch } => self.monitor(name, watch, ui),
        }
    }
}
