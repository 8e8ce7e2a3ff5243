//! Performance commands.
//!
//! Provides `opskit perf snapshot`, `monitor` and `report`. CPU usage is the
//! busy share of `/proc/stat` jiffies between two samples.

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chrono::Local;
use clap::{Args, Subcommand};

use crate::analysis::system::{
    cpu_usage, format_bytes, parse_cpu_stat, parse_loadavg, parse_meminfo, read_proc, CpuTimes,
    LoadAverage, MemoryInfo,
};
use crate::cli::args::MonitorArgs;
use crate::error::Result;
use crate::monitor::ProbeStatus;
use crate::shell::Invocation;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};
use super::system::format_load;

/// Gap between the two `/proc/stat` reads of a snapshot.
const CPU_SAMPLE: Duration = Duration::from_millis(200);

/// CPU or memory usage at or above this percentage marks a monitor probe down.
const ALERT_PERCENT: f64 = 90.0;

/// Process rows included in a report, header excluded.
const REPORT_TOP_PROCESSES: usize = 10;

/// Arguments for the perf command.
#[derive(Debug, Clone, Args)]
pub struct PerfArgs {
    #[command(subcommand)]
    pub command: PerfSubcommand,
}

/// Performance subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum PerfSubcommand {
    /// CPU, memory and load right now
    Snapshot,
    /// Sample CPU and memory repeatedly
    Monitor {
        #[command(flatten)]
        watch: MonitorArgs,
    },
    /// Write a performance report to the current directory
    Report,
}

impl PerfSubcommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Monitor { .. } => "monitor",
            Self::Report => "report",
        }
    }
}

/// One reading of the host.
#[derive(Debug, Clone)]
struct Snapshot {
    cpu_percent: f64,
    memory: MemoryInfo,
    load: LoadAverage,
}

impl Snapshot {
    fn memory_line(&self) -> String {
        format!(
            "{} / {} ({:.1}%)",
            format_bytes(self.memory.used()),
            format_bytes(self.memory.total),
            self.memory.used_percent()
        )
    }

    fn brief(&self) -> String {
        format!(
            "cpu {:.1}%, mem {:.1}%, load {:.2}",
            self.cpu_percent,
            self.memory.used_percent(),
            self.load.one
        )
    }

    fn is_alert(&self) -> bool {
        self.cpu_percent >= ALERT_PERCENT || self.memory.used_percent() >= ALERT_PERCENT
    }
}

/// The perf command implementation.
pub struct PerfCommand<'a> {
    ctx: &'a CommandContext,
    args: PerfArgs,
}

impl<'a> PerfCommand<'a> {
    pub fn new(ctx: &'a CommandContext, args: PerfArgs) -> Self {
        Self { ctx, args }
    }

    fn cpu_times(&self) -> Result<CpuTimes> {
        let content = read_proc(self.ctx.proc_root.join("stat"))?;
        Ok(parse_cpu_stat(&content)?)
    }

    /// Read memory and load, pairing them with usage since `prev`.
    fn reading(&self, prev: CpuTimes, next: CpuTimes) -> Result<Snapshot> {
        let memory = parse_meminfo(&read_proc(self.ctx.proc_root.join("meminfo"))?)?;
        let load = parse_loadavg(&read_proc(self.ctx.proc_root.join("loadavg"))?)?;
        Ok(Snapshot {
            cpu_percent: cpu_usage(prev, next),
            memory,
            load,
        })
    }

    fn sample(&self) -> Result<Snapshot> {
        let first = self.cpu_times()?;
        thread::sleep(CPU_SAMPLE);
        let second = self.cpu_times()?;
        self.reading(first, second)
    }

    fn snapshot(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let snap = self.sample()?;

        ui.show_header("Performance snapshot");
        ui.show_field("CPU", &format!("{:.1}%", snap.cpu_percent));
        ui.show_field("Memory", &snap.memory_line());
        ui.show_field("Load", &format_load(&snap.load));
        if snap.is_alert() {
            ui.warning(&format!("Usage above {:.0}%", ALERT_PERCENT));
        }

        Ok(CommandResult::success(snap.brief()))
    }

    fn monitor(&self, watch: &MonitorArgs, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut prev = self.cpu_times()?;
        let probe = || {
            let reading = self.cpu_times().and_then(|next| {
                let snap = self.reading(prev, next)?;
                prev = next;
                Ok(snap)
            });
            match reading {
                Ok(snap) if snap.is_alert() => ProbeStatus::down(snap.brief()),
                Ok(snap) => ProbeStatus::up(snap.brief()),
                Err(e) => ProbeStatus::down(e.to_string()),
            }
        };
        Ok(self.ctx.watch(ui, "host", watch, probe))
    }

    /// Stdout of a tool, or a note when it could not run.
    fn section(&self, ui: &mut dyn UserInterface, invocation: Invocation) -> String {
        let invocation = self.ctx.bounded(invocation);
        match self.ctx.run_tool(ui, &invocation) {
            Ok(output) => output.stdout,
            Err(e) => {
                tracing::warn!("Report section '{}' unavailable: {}", invocation.display(), e);
                format!("unavailable: {}\n", e)
            }
        }
    }

    fn report(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let now = Local::now();
        let path: PathBuf = self
            .ctx
            .cwd
            .join(format!("perf_report_{}.txt", now.format("%Y%m%d_%H%M%S")));

        let mut spinner = ui.start_spinner("Collecting performance data...");
        let snap = match self.sample() {
            Ok(snap) => snap,
            Err(e) => {
                spinner.finish_error("Collection failed");
                return Err(e);
            }
        };
        let host = self.section(ui, Invocation::new("uname").arg("-a"));
        let disk = self.section(ui, Invocation::new("df").args(["-P", "-h"]));
        let processes = self.section(
            ui,
            Invocation::new("ps").args(["-eo", "pid,user,%cpu,%mem,comm", "--sort=-%cpu"]),
        );

        let mut text = String::new();
        text.push_str("opskit performance report\n");
        text.push_str(&format!("Generated: {}\n", now.format("%Y-%m-%d %H:%M:%S")));
        text.push_str(&format!("Host: {}\n", host.trim()));
        text.push_str("\n== Summary ==\n");
        text.push_str(&format!("CPU usage: {:.1}%\n", snap.cpu_percent));
        text.push_str(&format!("Memory: {}\n", snap.memory_line()));
        text.push_str(&format!("Load average: {}\n", format_load(&snap.load)));
        text.push_str("\n== Disk ==\n");
        text.push_str(&disk);
        text.push_str("\n== Top processes ==\n");
        for line in processes.lines().take(REPORT_TOP_PROCESSES + 1) {
            text.push_str(line);
            text.push('\n');
        }

        if let Err(e) = fs::write(&path, text) {
            spinner.finish_error("Could not write report");
            return Err(e.into());
        }
        spinner.finish_success(&format!("Report written to {}", path.display()));

        Ok(CommandResult::success(format!("wrote {}", path.display())))
    }
}

impl Command for PerfCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.command {
            PerfSubcommand::Snapshot => self.snapshot(ui),
            PerfSubcommand::Monitor { watch } => self.monitor(watch, ui),
            PerfSubcommand::Report => self.report(ui),
        }
    }
}
