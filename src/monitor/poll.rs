//! Generic probe loop shared by all monitors.

use chrono::{DateTime, Local};

use super::ticker::Ticker;

/// Result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeStatus {
    pub healthy: bool,
    pub detail: String,
}

impl ProbeStatus {
    pub fn up(detail: impl Into<String>) -> Self {
        Self {
            healthy: true,
            detail: detail.into(),
        }
    }

    pub fn down(detail: impl Into<String>) -> Self {
        Self {
            healthy: false,
            detail: detail.into(),
        }
    }
}

/// Format a probe as a timestamped status line.
pub fn status_line(timestamp: DateTime<Local>, target: &str, status: &ProbeStatus) -> String {
    format!(
        "[{}] {} {} - {}",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        target,
        if status.healthy { "UP" } else { "DOWN" },
        status.detail
    )
}

/// Totals after a monitor stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorSummary {
    pub probes: u64,
    pub failures: u64,
    pub last: Option<ProbeStatus>,
    /// Stopped by the stop signal rather than reaching the probe limit.
    pub interrupted: bool,
}

impl MonitorSummary {
    pub fn describe(&self) -> String {
        format!(
            "{} probe(s), {} failure(s){}",
            self.probes,
            self.failures,
            if self.interrupted { ", interrupted" } else { "" }
        )
    }
}

/// Probe once per tick until stopped or `max_probes` is reached.
///
/// `max_probes == None` runs until the ticker's stop signal trips. No
/// backoff is applied after failures.
pub fn run_monitor<P, R>(
    ticker: &Ticker,
    max_probes: Option<u64>,
    mut probe: P,
    mut report: R,
) -> MonitorSummary
where
    P: FnMut() -> ProbeStatus,
    R: FnMut(u64, DateTime<Local>, &ProbeStatus),
{
    let mut summary = MonitorSummary::default();

    loop {
        if ticker.stop_signal().is_triggered() {
            summary.interrupted = true;
            break;
        }

        let status = probe();
        summary.probes += 1;
        if !status.healthy {
            summary.failures += 1;
        }
        report(summary.probes, Local::now(), &status);
        summary.last = Some(status);

        if max_probes.is_some_and(|max| summary.probes >= max) {
            break;
        }

        if !ticker.wait() {
            summary.interrupted = true;
            break;
        }
    }

    summary
}
