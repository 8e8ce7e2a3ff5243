//! Docker commands.
//!
//! Provides `opskit docker ps`, `images`, `logs`, `stats` and `cleanup`.
//! Listings ask docker for tab-separated Go templates so rows can be split
//! without scraping its column layout.

use clap::{Args, Subcommand};

use crate::error::Result;
use crate::shell::Invocation;
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};
use super::non_empty;

const PS_FORMAT: &str = "{{.ID}}\t{{.Names}}\t{{.Image}}\t{{.Status}}";
const IMAGES_FORMAT: &str = "{{.Repository}}:{{.Tag}}\t{{.ID}}\t{{.Size}}";
const STATS_FORMAT: &str = "{{.Name}}\t{{.CPUPerc}}\t{{.MemUsage}}\t{{.NetIO}}";

/// Arguments for the docker command.
#[derive(Debug, Clone, Args)]
pub struct DockerArgs {
    #[command(subcommand)]
    pub command: DockerSubcommand,
}

/// Docker subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum DockerSubcommand {
    /// List containers
    Ps {
        /// Include stopped containers
        #[arg(short, long)]
        all: bool,
    },
    /// List images
    Images,
    /// Show container logs
    Logs {
        /// Container name or id
        #[arg(value_parser = non_empty())]
        container: String,
        /// Number of lines from the end
        #[arg(short = 'n', long, default_value_t = 50)]
        lines: usize,
    },
    /// One-shot resource usage per container
    Stats,
    /// Remove stopped containers, dangling images and unused networks
    Cleanup,
}

impl DockerSubcommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ps { .. } => "ps",
            Self::Images => "images",
            Self::Logs { .. } => "logs",
            Self::Stats => "stats",
            Self::Cleanup => "cleanup",
        }
    }
}

fn docker() -> Invocation {
    Invocation::new("docker")
}

/// Split tab-separated template output into a table.
fn tabulate(headers: &[&str], output: &str) -> Table {
    let mut table = Table::new(headers);
    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        table.add_row(line.split('\t'));
    }
    table
}

/// The docker command implementation.
pub struct DockerCommand<'a> {
    ctx: &'a CommandContext,
    args: DockerArgs,
}

impl<'a> DockerCommand<'a> {
    pub fn new(ctx: &'a CommandContext, args: DockerArgs) -> Self {
        Self { ctx, args }
    }

    fn listing(
        &self,
        ui: &mut dyn UserInterface,
        inv: Invocation,
        title: &str,
        headers: &[&str],
        noun: &str,
    ) -> Result<CommandResult> {
        let output = self.ctx.run_tool(ui, &self.ctx.bounded(inv))?;
        let table = tabulate(headers, &output.stdout);
        ui.show_header(title);
        ui.show_table(&table);
        Ok(CommandResult::success(format!(
            "{} {}(s)",
            table.row_count(),
            noun
        )))
    }

    fn logs(
        &self,
        container: &str,
        lines: usize,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let inv = self
            .ctx
            .bounded(docker().args(["logs", "--tail", &lines.to_string(), container]));
        let output = self.ctx.run_tool(ui, &inv)?;

        // Containers write to both streams; docker forwards them separately.
        for line in output.stdout.lines().chain(output.stderr.lines()) {
            ui.message(line);
        }

        Ok(CommandResult::success(format!(
            "last {} line(s) of {}",
            lines, container
        )))
    }

    fn cleanup(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let question = "Remove stopped containers, dangling images and unused networks?";
        if !self.ctx.assume_yes && !ui.confirm(question, false)? {
            ui.message("Cancelled");
            return Ok(CommandResult::success("cancelled"));
        }

        let mut spinner = ui.start_spinner("Pruning docker resources...");
        let output = match self.ctx.run_tool(ui, &docker().args(["system", "prune", "-f"])) {
            Ok(output) => output,
            Err(e) => {
                spinner.finish_error("Cleanup failed");
                return Err(e);
            }
        };
        let reclaimed = output
            .stdout
            .lines()
            .find(|l| l.starts_with("Total reclaimed space"))
            .unwrap_or("Cleanup complete")
            .to_string();
        spinner.finish_success(&reclaimed);

        Ok(CommandResult::success(reclaimed))
    }
}

impl Command for DockerCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.command {
            DockerSubcommand::Ps { all } => {
                let mut inv = docker().arg("ps");
                if *all {
                    inv = inv.arg("--all");
                }
                self.listing(
                    ui,
                    inv.args(["--format", PS_FORMAT]),
                    "Containers",
                    &["ID", "Name", "Image", "Status"],
                    "container",
                )
            }
            DockerSubcommand::Images => self.listing(
                ui,
                docker().args(["images", "--format", IMAGES_FORMAT]),
                "Images",
                &["Image", "ID", "Size"],
                "image",
            ),
            DockerSubcommand::Logs { container, lines } => self.logs(container, *lines, ui),
            DockerSubcommand::Stats => self.listing(
                ui,
                docker().args(["stats", "--no-stream", "--format", STATS_FORMAT]),
                "Container resource usage",
                &["Name", "CPU", "Memory", "Net I/O"],
                "container",
            ),
            DockerSubcommand::Cleanup => self.cleanup(ui),
        }
    }
}
