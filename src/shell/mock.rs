//! Recording tool runner for testing.
//!
//! `RecordingRunner` implements [`ToolRunner`] without spawning anything.
//! It records every invocation and replies with queued outputs (or a plain
//! success when the queue is empty).
//!
//! # Example
//!
//! ```
//! use opskit::shell::{CommandOutput, Invocation, RecordingRunner, ToolRunner};
//!
//! let runner = RecordingRunner::new();
//! runner.push_output(CommandOutput::success("main\n"));
//!
//! let out = runner.run(&Invocation::new("git").arg("branch")).unwrap();
//! assert_eq!(out.stdout, "main\n");
//! assert_eq!(runner.invocations()[0].display(), "git branch");
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{OpsError, Result};

use super::command::{CommandOutput, Invocation, ToolRunner};

enum Reply {
    Output(CommandOutput),
    MissingTool,
}

/// Tool runner that records invocations instead of executing them.
#[derive(Default)]
pub struct RecordingRunner {
    invocations: Mutex<Vec<Invocation>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl RecordingRunner {
    /// Create a runner that answers every invocation with success.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the output for the next invocation.
    pub fn push_output(&self, output: CommandOutput) {
        self.lock_replies().push_back(Reply::Output(output));
    }

    /// Make the next invocation fail as if the tool were not installed.
    pub fn push_missing_tool(&self) {
        self.lock_replies().push_back(Reply::MissingTool);
    }

    /// Every invocation seen so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    /// Whether any invocation was made.
    pub fn was_invoked(&self) -> bool {
        !self.invocations().is_empty()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Reply>> {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        if let Ok(mut seen) = self.invocations.lock() {
            seen.push(invocation.clone());
        }

        match self.lock_replies().pop_front() {
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::MissingTool) => Err(OpsError::ToolNotFound {
                tool: invocation.program.clone(),
            }),
            None => Ok(CommandOutput::success("")),
        }
    }
}
