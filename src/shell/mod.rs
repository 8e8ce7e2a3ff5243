//! External tool execution and platform detection.

pub mod command;
pub mod mock;
pub mod platform;

pub use command::{execute, CommandOutput, Invocation, SystemRunner, ToolRunner};
pub use mock::RecordingRunner;
pub use platform::{is_ci, is_elevated};
