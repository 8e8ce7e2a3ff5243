//! Polling monitors with clean shutdown.
//!
//! A monitor probes a target once per [`Ticker`] interval and prints a
//! timestamped status line. Ctrl-C trips the [`StopSignal`] so the loop
//! ends between probes and prints its [`MonitorSummary`].

pub mod poll;
pub mod ticker;

pub use poll::{run_monitor, status_line, MonitorSummary, ProbeStatus};
pub use ticker::{StopSignal, Ticker};
