//! Network commands.
//!
//! Provides `opskit net ping`, `ports`, `check-port`, `dns` and `monitor`.
//! TCP reachability and name resolution use `std::net`; ICMP goes through
//! the system `ping`.

use std::collections::BTreeSet;
use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::OnceLock;
use std::time::Duration;

use clap::{Args, Subcommand};
use regex::Regex;

use crate::analysis::system::parse_ss;
use crate::cli::args::MonitorArgs;
use crate::error::{OpsError, Result};
use crate::monitor::ProbeStatus;
use crate::shell::Invocation;
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};
use super::non_empty;

/// Per-reply wait for a single monitor ping.
const MONITOR_PING_WAIT_SECS: u64 = 2;

/// Arguments for the net command.
#[derive(Debug, Clone, Args)]
pub struct NetArgs {
    #[command(subcommand)]
    pub command: NetSubcommand,
}

/// Network subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum NetSubcommand {
    /// Send ICMP echo requests
    Ping {
        /// Host name or address
        #[arg(value_parser = non_empty())]
        host: String,
        /// Number of packets
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
    },
    /// Listening TCP and UDP sockets
    Ports,
    /// Whether a TCP port accepts connections
    CheckPort {
        /// Host name or address
        #[arg(value_parser = non_empty())]
        host: String,
        /// TCP port
        #[arg(value_parser = clap::value_parser!(u16).range(1..))]
        port: u16,
    },
    /// Resolve a host name
    Dns {
        /// Host name
        #[arg(value_parser = non_empty())]
        host: String,
    },
    /// Ping a host repeatedly
    Monitor {
        /// Host name or address
        #[arg(value_parser = non_empty())]
        host: String,
        #[command(flatten)]
        watch: MonitorArgs,
    },
}

impl NetSubcommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ping { .. } => "ping",
            Self::Ports => "ports",
            Self::CheckPort { .. } => "check-port",
            Self::Dns { .. } => "dns",
            Self::Monitor { .. } => "monitor",
        }
    }
}

fn loss_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([\d.]+)% packet loss").expect("static regex"))
}

fn rtt_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"time[=<]([\d.]+) ?ms").expect("static regex"))
}

/// Packet loss percentage from ping's statistics line.
pub(crate) fn packet_loss(output: &str) -> Option<f64> {
    loss_regex()
        .captures(output)
        .and_then(|c| c[1].parse().ok())
}

/// Round-trip time of the first reply, in milliseconds.
pub(crate) fn first_rtt(output: &str) -> Option<f64> {
    rtt_regex().captures(output).and_then(|c| c[1].parse().ok())
}

/// Resolve `host` to its distinct addresses.
fn resolve(host: &str) -> Result<Vec<IpAddr>> {
    let addrs = (host, 0)
        .to_socket_addrs()
        .map_err(|e| OpsError::Resolve {
            host: host.to_string(),
            message: e.to_string(),
        })?;
    let unique: BTreeSet<IpAddr> = addrs.map(|a| a.ip()).collect();
    Ok(unique.into_iter().collect())
}

/// The net command implementation.
pub struct NetCommand<'a> {
    ctx: &'a CommandContext,
    args: NetArgs,
}

impl<'a> NetCommand<'a> {
    pub fn new(ctx: &'a CommandContext, args: NetArgs) -> Self {
        Self { ctx, args }
    }

    fn ping(&self, host: &str, count: u32, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let inv = Invocation::new("ping").args(["-c", &count.to_string(), host]);
        let output = self.ctx.run_tool(ui, &inv)?;

        // Statistics are the last two lines.
        let lines: Vec<&str> = output.stdout.lines().collect();
        for line in &lines[lines.len().saturating_sub(2)..] {
            ui.message(line);
        }

        let loss = packet_loss(&output.stdout);
        if let Some(loss) = loss {
            ui.show_field("Packet loss", &format!("{}%", loss));
        }
        Ok(CommandResult::success(match loss {
            Some(loss) => format!("{} reachable, {}% packet loss", host, loss),
            None => format!("{} reachable", host),
        }))
    }

    fn ports(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let output = self
            .ctx
            .run_tool(ui, &self.ctx.bounded(Invocation::new("ss").arg("-tuln")))?;
        let sockets = parse_ss(&output.stdout);

        let mut table = Table::new(&["Proto", "Address", "Port"]);
        for s in &sockets {
            table.add_row([s.protocol.clone(), s.address.clone(), s.port.to_string()]);
        }
        ui.show_header("Listening sockets");
        ui.show_table(&table);

        Ok(CommandResult::success(format!(
            "{} listening socket(s)",
            sockets.len()
        )))
    }

    fn check_port(
        &self,
        host: &str,
        port: u16,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let timeout = self.ctx.settings.commands.timeout();
        let target = format!("{}:{}", host, port);

        if port_open(host, port, timeout)? {
            ui.success(&format!("{} is open", target));
            Ok(CommandResult::success(format!("{} open", target)))
        } else {
            ui.error(&format!("{} is closed or unreachable", target));
            Ok(CommandResult::failure(1, format!("{} closed", target)))
        }
    }

    fn dns(&self, host: &str, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let addrs = resolve(host)?;
        ui.show_header(&format!("DNS: {}", host));
        for addr in &addrs {
            ui.message(&addr.to_string());
        }
        Ok(CommandResult::success(format!(
            "{} resolved to {} address(es)",
            host,
            addrs.len()
        )))
    }

    fn monitor(
        &self,
        host: &str,
        watch: &MonitorArgs,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let ctx = self.ctx;
        let wait = MONITOR_PING_WAIT_SECS.to_string();
        let inv = ctx.bounded(Invocation::new("ping").args(["-c", "1", "-W", &wait, host]));
        let probe = || match ctx.run_quiet(&inv) {
            Ok(output) if output.success => match first_rtt(&output.stdout) {
                Some(ms) => ProbeStatus::up(format!("reply in {} ms", ms)),
                None => ProbeStatus::up("reply"),
            },
            Ok(output) => ProbeStatus::down(match output.diagnostic() {
                "" => "no reply",
                d => d,
            }),
            Err(e) => ProbeStatus::down(e.to_string()),
        };
        Ok(ctx.watch(ui, host, watch, probe))
    }
}

/// Try every resolved address until one accepts a TCP connection.
fn port_open(host: &str, port: u16, timeout: Duration) -> Result<bool> {
    for ip in resolve(host)? {
        if TcpStream::connect_timeout(&SocketAddr::new(ip, port), timeout).is_ok() {
            return Ok(true);
        }
    }
    Ok(false)
}

impl Command for NetCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.command {
            NetSubcommand::Ping { host, count } => self.ping(host, *count, ui),
            NetSubcommand::Ports => self.ports(ui),
            NetSubcommand::CheckPort { host, port } => self.check_port(host, *port, ui),
            NetSubcommand::Dns { host } => self.dns(host, ui),
            NetSubcommand::Monitor { host, watch } => self.monitor(host, watch, ui),
        }
    }
}
