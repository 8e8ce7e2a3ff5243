//! Host information commands.
//!
//! Provides `opskit system overview`, `disk`, `memory` and `uptime`.
//! Kernel and disk figures come from `uname` and `df`; everything else is
//! read from procfs.

use clap::{Args, Subcommand};

use crate::analysis::system::{
    format_bytes, format_uptime, parse_df, parse_loadavg, parse_meminfo, parse_uptime, read_proc,
    LoadAverage, MemoryInfo,
};
use crate::error::Result;
use crate::shell::Invocation;
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// Disk usage at or above this percentage is flagged.
const DISK_WARN_PERCENT: u8 = 90;

/// Arguments for the system command.
#[derive(Debug, Clone, Args)]
pub struct SystemArgs {
    #[command(subcommand)]
    pub command: SystemSubcommand,
}

/// System subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum SystemSubcommand {
    /// Kernel, uptime, load, memory and CPU count
    Overview,
    /// Filesystem usage
    Disk,
    /// Memory and swap usage
    Memory,
    /// Uptime and load averages
    Uptime,
}

impl SystemSubcommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Disk => "disk",
            Self::Memory => "memory",
            Self::Uptime => "uptime",
        }
    }
}

/// The system command implementation.
pub struct SystemCommand<'a> {
    ctx: &'a CommandContext,
    args: SystemArgs,
}

impl<'a> SystemCommand<'a> {
    pub fn new(ctx: &'a CommandContext, args: SystemArgs) -> Self {
        Self { ctx, args }
    }

    fn memory(&self) -> Result<MemoryInfo> {
        let content = read_proc(self.ctx.proc_root.join("meminfo"))?;
        Ok(parse_meminfo(&content)?)
    }

    fn load(&self) -> Result<LoadAverage> {
        let content = read_proc(self.ctx.proc_root.join("loadavg"))?;
        Ok(parse_loadavg(&content)?)
    }

    fn uptime_text(&self) -> Result<String> {
        let content = read_proc(self.ctx.proc_root.join("uptime"))?;
        Ok(format_uptime(parse_uptime(&content)?))
    }

    fn overview(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let kernel = self
            .ctx
            .run_tool(ui, &self.ctx.bounded(Invocation::new("uname").arg("-sr")))?;
        let kernel = kernel.stdout.trim().to_string();
        let uptime = self.uptime_text()?;
        let load = self.load()?;
        let mem = self.memory()?;
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        ui.show_header("System overview");
        ui.show_field("Kernel", &kernel);
        ui.show_field("Uptime", &uptime);
        ui.show_field("Load", &format_load(&load));
        ui.show_field("CPUs", &cpus.to_string());
        ui.show_field(
            "Memory",
            &format!(
                "{} / {} ({:.1}%)",
                format_bytes(mem.used()),
                format_bytes(mem.total),
                mem.used_percent()
            ),
        );

        Ok(CommandResult::success(format!("{}, up {}", kernel, uptime)))
    }

    fn disk(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let inv = self.ctx.bounded(Invocation::new("df").args(["-P", "-k"]));
        let output = self.ctx.run_tool(ui, &inv)?;
        let disks = parse_df(&output.stdout);

        let mut table = Table::new(&["Filesystem", "Size", "Used", "Avail", "Use%", "Mounted on"]);
        for d in &disks {
            table.add_row([
                d.filesystem.clone(),
                format_bytes(d.size),
                format_bytes(d.used),
                format_bytes(d.available),
                format!("{}%", d.use_percent),
                d.mount.clone(),
            ]);
        }
        ui.show_header("Disk usage");
        ui.show_table(&table);

        let full: Vec<_> = disks
            .iter()
            .filter(|d| d.use_percent >= DISK_WARN_PERCENT)
            .collect();
        for d in &full {
            ui.warning(&format!("{} is {}% full", d.mount, d.use_percent));
        }

        Ok(CommandResult::success(format!(
            "{} filesystem(s), {} at or above {}%",
            disks.len(),
            full.len(),
            DISK_WARN_PERCENT
        )))
    }

    fn show_memory(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mem = self.memory()?;

        ui.show_header("Memory");
        ui.show_field("Total", &format_bytes(mem.total));
        ui.show_field("Used", &format_bytes(mem.used()));
        ui.show_field("Available", &format_bytes(mem.available));
        ui.show_field("Used %", &format!("{:.1}%", mem.used_percent()));
        if mem.swap_total > 0 {
            ui.show_field(
                "Swap",
                &format!(
                    "{} / {}",
                    format_bytes(mem.swap_used()),
                    format_bytes(mem.swap_total)
                ),
            );
        }

        Ok(CommandResult::success(format!(
            "{:.1}% memory used",
            mem.used_percent()
        )))
    }

    fn show_uptime(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let uptime = self.uptime_text()?;
        let load = self.load()?;

        ui.show_field("Uptime", &uptime);
        ui.show_field("Load", &format_load(&load));

        Ok(CommandResult::success(format!("up {}", uptime)))
    }
}

pub(super) fn format_load(load: &LoadAverage) -> String {
    format!("{:.2} {:.2} {:.2}", load.one, load.five, load.fifteen)
}

impl Command for SystemCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match self.args.command {
            SystemSubcommand::Overview => self.overview(ui),
            SystemSubcommand::Disk => self.disk(ui),
            SystemSubcommand::Memory => self.show_memory(ui),
            SystemSubcommand::Uptime => self.show_uptime(ui),
        }
    }
}
