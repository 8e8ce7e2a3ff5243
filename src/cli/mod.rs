//! Command-line interface for opskit.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Top-level flags and the command group enum
//! - [`commands`] - One module per command group

pub mod args;
pub mod commands;

pub use args::{usage_for, Cli, Commands, CompletionsArgs, MonitorArgs};
pub use commands::{Command, CommandContext, CommandDispatcher, CommandResult};
