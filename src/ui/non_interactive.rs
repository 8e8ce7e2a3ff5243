//! Non-interactive UI for pipes, CI and scripts.

use crate::error::Result;

use super::prompts::parse_answer;
use super::{OutputMode, SpinnerHandle, Table, UserInterface};

/// Environment variable that answers confirmation prompts when no TTY is attached.
pub const CONFIRM_ENV: &str = "OPSKIT_CONFIRM";

/// UI implementation for non-interactive mode.
///
/// Output is plain text: results to stdout, warnings and errors to stderr.
/// Confirmations are declined unless [`CONFIRM_ENV`] answers them.
pub struct NonInteractiveUI {
    mode: OutputMode,
    confirm_override: Option<bool>,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        let confirm_override = std::env::var(CONFIRM_ENV)
            .ok()
            .and_then(|v| parse_answer(&v));
        Self {
            mode,
            confirm_override,
        }
    }

    /// Create with an explicit confirmation answer (for testing).
    pub fn with_confirm(mode: OutputMode, answer: Option<bool>) -> Self {
        Self {
            mode,
            confirm_override: answer,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        println!("{}", msg);
    }

    fn success(&mut self, msg: &str) {
        println!("✓ {}", msg);
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("⚠ {}", msg);
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_decorations() {
            println!("\n{}\n", title);
        }
    }

    fn show_field(&mut self, key: &str, value: &str) {
        println!("  {}: {}", key, value);
    }

    fn show_table(&mut self, table: &Table) {
        println!("{}", table.render());
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_decorations() {
            println!("  Hint: {}", hint);
        }
    }

    fn show_error_block(&mut self, command: &str, output: &str, hint: Option<&str>) {
        eprintln!();
        eprintln!("    ┌─ Command ──────────────────────────");
        eprintln!("    │ {}", command);
        if !output.is_empty() {
            eprintln!("    ├─ Output ───────────────────────────");
            for line in output.lines() {
                eprintln!("    │ {}", line);
            }
        }
        eprintln!("    └────────────────────────────────────");
        if let Some(h) = hint {
            eprintln!();
            eprintln!("    Hint: {}", h);
        }
    }

    fn confirm(&mut self, question: &str, _default: bool) -> Result<bool> {
        let answer = self.confirm_override.unwrap_or(false);
        println!("{} {}", question, if answer { "yes" } else { "no" });
        Ok(answer)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            println!("{}", message);
        }
        Box::new(NoopSpinner)
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that does nothing (for non-interactive mode).
struct NoopSpinner;

impl SpinnerHandle for NoopSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        println!("✓ {}", msg);
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn finish_clear(&mut self) {}
}
