//! CLI command implementations.
//!
//! Each command group implements the [`Command`] trait, which provides a
//! uniform interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`opskit system disk`, `opskit api suite`)
//! - Configuration loaded once and passed in a [`CommandContext`]
//! - One audit log line per invocation

pub mod api;
pub mod backup;
pub mod completions;
pub mod db;
pub mod dispatcher;
pub mod docker;
pub mod git;
pub mod logs;
pub mod network;
pub mod perf;
pub mod process;
pub mod security;
pub mod system;
pub mod text;

pub use dispatcher::{Command, CommandContext, CommandDispatcher, CommandResult};

/// Value parser rejecting empty positional arguments.
pub(crate) fn non_empty() -> clap::builder::NonEmptyStringValueParser {
    clap::builder::NonEmptyStringValueParser::new()
}
