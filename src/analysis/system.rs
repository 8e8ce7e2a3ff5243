//! Parsers for `/proc` files and `df`, `ss`, `ps` output, plus human-readable formatting.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};

/// Memory figures from `/proc/meminfo`, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryInfo {
    pub total: u64,
    pub available: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

impl MemoryInfo {
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.available)
    }

    pub fn used_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.used() as f64 * 100.0 / self.total as f64
        }
    }

    pub fn swap_used(&self) -> u64 {
        self.swap_total.saturating_sub(self.swap_free)
    }
}

/// Parse `/proc/meminfo` content.
///
/// Kernels before 3.14 lack `MemAvailable`; fall back to free + buffers + cached.
pub fn parse_meminfo(content: &str) -> anyhow::Result<MemoryInfo> {
    let fields: HashMap<&str, u64> = content
        .lines()
        .filter_map(|line| {
            let (key, rest) = line.split_once(':')?;
            let kb = rest.split_whitespace().next()?.parse::<u64>().ok()?;
            Some((key.trim(), kb * 1024))
        })
        .collect();

    let total = *fields
        .get("MemTotal")
        .ok_or_else(|| anyhow!("MemTotal missing from meminfo"))?;
    let available = match fields.get("MemAvailable") {
        Some(v) => *v,
        None => ["MemFree", "Buffers", "Cached"]
            .iter()
            .filter_map(|k| fields.get(k))
            .sum(),
    };

    Ok(MemoryInfo {
        total,
        available,
        swap_total: fields.get("SwapTotal").copied().unwrap_or(0),
        swap_free: fields.get("SwapFree").copied().unwrap_or(0),
    })
}

/// Load averages from `/proc/loadavg`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

pub fn parse_loadavg(content: &str) -> anyhow::Result<LoadAverage> {
    let mut parts = content.split_whitespace().map(str::parse::<f64>);
    let mut next = |which: &str| -> anyhow::Result<f64> {
        parts
            .next()
            .ok_or_else(|| anyhow!("loadavg missing {} minute value", which))?
            .with_context(|| format!("invalid {} minute load", which))
    };
    Ok(LoadAverage {
        one: next("1")?,
        five: next("5")?,
        fifteen: next("15")?,
    })
}

/// Uptime from the first field of `/proc/uptime`.
pub fn parse_uptime(content: &str) -> anyhow::Result<Duration> {
    let secs: f64 = content
        .split_whitespace()
        .next()
        .ok_or_else(|| anyhow!("empty uptime"))?
        .parse()
        .context("invalid uptime value")?;
    Ok(Duration::from_secs(secs as u64))
}

/// One filesystem row from `df -P -k`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskUsage {
    pub filesystem: String,
    pub size: u64,
    pub used: u64,
    pub available: u64,
    pub use_percent: u8,
    pub mount: String,
}

/// Parse POSIX `df -P -k` output (sizes in KiB, converted to bytes).
pub fn parse_df(output: &str) -> Vec<DiskUsage> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 6 {
                return None;
            }
            Some(DiskUsage {
                filesystem: cols[0].to_string(),
                size: cols[1].parse::<u64>().ok()? * 1024,
                used: cols[2].parse::<u64>().ok()? * 1024,
                available: cols[3].parse::<u64>().ok()? * 1024,
                use_percent: cols[4].trim_end_matches('%').parse().ok()?,
                // Mount points may contain spaces.
                mount: cols[5..].join(" "),
            })
        })
        .collect()
}

/// Read a `/proc`-style file with context on failure.
pub fn read_proc(path: impl AsRef<Path>) -> anyhow::Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Format a byte count using binary units, e.g. `1.5 GiB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Format an uptime as `3d 4h 12m`.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Aggregate CPU jiffies from the first line of `/proc/stat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub busy: u64,
    pub idle: u64,
}

impl CpuTimes {
    pub fn total(&self) -> u64 {
        self.busy + self.idle
    }
}

pub fn parse_cpu_stat(content: &str) -> anyhow::Result<CpuTimes> {
    let line = content
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or_else(|| anyhow!("no aggregate cpu line"))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(|f| f.parse::<u64>())
        .collect::<Result<_, _>>()
        .context("invalid cpu counter")?;
    if fields.len() < 4 {
        bail!("cpu line has {} counters, expected at least 4", fields.len());
    }
    // user nice system idle iowait irq softirq steal
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    let busy = fields.iter().sum::<u64>() - idle;
    Ok(CpuTimes { busy, idle })
}

/// Busy percentage between two samples; 0 when no time elapsed.
pub fn cpu_usage(prev: CpuTimes, next: CpuTimes) -> f64 {
    let total = next.total().saturating_sub(prev.total());
    if total == 0 {
        return 0.0;
    }
    let busy = next.busy.saturating_sub(prev.busy);
    busy as f64 * 100.0 / total as f64
}

/// A listening socket from `ss -tuln`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListeningSocket {
    pub protocol: String,
    pub address: String,
    pub port: u16,
}

impl ListeningSocket {
    /// Bound to every interface rather than loopback only.
    pub fn is_public(&self) -> bool {
        matches!(self.address.as_str(), "0.0.0.0" | "::" | "*")
    }
}

/// Parse `ss -tuln` output. Rows whose local port is not numeric are skipped.
pub fn parse_ss(output: &str) -> Vec<ListeningSocket> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 5 {
                return None;
            }
            let (addr, port) = cols[4].rsplit_once(':')?;
            let addr = addr.trim_start_matches('[').trim_end_matches(']');
            // Strip an interface scope such as `127.0.0.53%lo`.
            let addr = addr.split('%').next().unwrap_or(addr);
            Some(ListeningSocket {
                protocol: cols[0].to_string(),
                address: addr.to_string(),
                port: port.parse().ok()?,
            })
        })
        .collect()
}

/// One row of `ps -eo pid,user,%cpu,%mem,comm`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRow {
    pub pid: u32,
    pub user: String,
    pub cpu: f64,
    pub mem: f64,
    pub command: String,
}

pub fn parse_ps(output: &str) -> Vec<ProcessRow> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 5 {
                return None;
            }
            Some(ProcessRow {
                pid: cols[0].parse().ok()?,
                user: cols[1].to_string(),
                cpu: cols[2].parse().ok()?,
                mem: cols[3].parse().ok()?,
                command: cols[4..].join(" "),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "\
MemTotal:        8000000 kB
MemFree:         1000000 kB
MemAvailable:    6000000 kB
Buffers:          100000 kB
Cached:          2000000 kB
SwapTotal:       2000000 kB
SwapFree:        1500000 kB
";

    #[test]
    fn meminfo_uses_available() {
        let mem = parse_meminfo(MEMINFO).unwrap();

        assert_eq!(mem.total, 8_000_000 * 1024);
        assert_eq!(mem.used(), 2_000_000 * 1024);
        assert_eq!(mem.used_percent().round(), 25.0);
        assert_eq!(mem.swap_used(), 500_000 * 1024);
    }

    #[test]
    fn meminfo_falls_back_without_available() {
        let content = "MemTotal: 1000 kB\nMemFree: 100 kB\nBuffers: 50 kB\nCached: 250 kB\n";
        let mem = parse_meminfo(content).unwrap();
        assert_eq!(mem.available, 400 * 1024);
    }

    #[test]
    fn meminfo_requires_total() {
        assert!(parse_meminfo("MemFree: 1 kB\n").is_err());
    }

    #[test]
    fn loadavg_parses() {
        let load = parse_loadavg("0.52 0.58 0.59 1/467 12345\n").unwrap();
        assert_eq!(load.one, 0.52);
        assert_eq!(load.fifteen, 0.59);
        assert!(parse_loadavg("0.1").is_err());
    }

    #[test]
    fn uptime_parses_and_formats() {
        let up = parse_uptime("273600.55 1000.00\n").unwrap();
        assert_eq!(format_uptime(up), "3d 4h 0m");
        assert_eq!(format_uptime(Duration::from_secs(3 * 60)), "3m");
        assert_eq!(format_uptime(Duration::from_secs(3600 + 120)), "1h 2m");
    }

    #[test]
    fn df_rows_parse() {
        let out = "\
Filesystem     1024-blocks     Used Available Capacity Mounted on
/dev/sda1         10000000  4000000   6000000      40% /
tmpfs               100000        0    100000       0% /run/user/1000
/dev/sdb1             1000      500       500      50% /mnt/my disk
";
        let rows = parse_df(out);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].use_percent, 40);
        assert_eq!(rows[0].size, 10_000_000 * 1024);
        assert_eq!(rows[2].mount, "/mnt/my disk");
    }

    #[test]
    fn bytes_format() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }

    #[test]
    fn cpu_stat_splits_busy_and_idle() {
        let stat = "cpu  100 0 50 800 50 0 0 0 0 0\ncpu0 50 0 25 400 25 0 0 0 0 0\n";
        let times = parse_cpu_stat(stat).unwrap();

        assert_eq!(times.idle, 850);
        assert_eq!(times.busy, 150);
        assert!(parse_cpu_stat("intr 1 2 3\n").is_err());
    }

    #[test]
    fn cpu_usage_from_deltas() {
        let prev = CpuTimes { busy: 100, idle: 900 };
        let next = CpuTimes { busy: 150, idle: 950 };

        assert_eq!(cpu_usage(prev, next), 50.0);
        assert_eq!(cpu_usage(prev, prev), 0.0);
    }

    #[test]
    fn ss_rows_parse() {
        let out = "\
Netid State  Recv-Q Send-Q Local Address:Port  Peer Address:Port Process
udp   UNCONN 0      0      127.0.0.53%lo:53         0.0.0.0:*
tcp   LISTEN 0      4096   0.0.0.0:22               0.0.0.0:*
tcp   LISTEN 0      128    [::]:8080                [::]:*
tcp   LISTEN 0      128    127.0.0.1:5432           0.0.0.0:*
";
        let sockets = parse_ss(out);

        assert_eq!(sockets.len(), 4);
        assert_eq!(sockets[0].address, "127.0.0.53");
        assert_eq!(sockets[0].port, 53);
        assert!(sockets[1].is_public());
        assert_eq!(sockets[2].address, "::");
        assert!(sockets[2].is_public());
        assert!(!sockets[3].is_public());
    }

    #[test]
    fn ps_rows_parse() {
        let out = "\
  PID USER     %CPU %MEM COMMAND
 1234 www       12.5  3.1 nginx
    1 root       0.0  0.1 systemd
";
        let rows = parse_ps(out);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].pid, 1234);
        assert_eq!(rows[0].cpu, 12.5);
        assert_eq!(rows[1].command, "systemd");
    }
}
