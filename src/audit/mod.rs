//! Audit trail of command outcomes.

pub mod log;

pub use log::{format_line, AuditLog, LogLevel};
