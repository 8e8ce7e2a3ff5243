//! Log analysis commands.
//!
//! Provides `opskit logs summary`, `errors`, `search` and `tail`.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use regex::Regex;

use crate::analysis::logs::{search, summarize, tail, top_errors};
use crate::analysis::read_text;
use crate::error::{OpsError, Result};
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::non_empty;

/// Arguments for the logs command.
#[derive(Debug, Clone, Args)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub command: LogsSubcommand,
}

/// Logs subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum LogsSubcommand {
    /// Count lines per severity
    Summary {
        /// Log file to analyze
        file: PathBuf,
    },
    /// Most frequent error messages
    Errors {
        /// Log file to analyze
        file: PathBuf,
        /// How many messages to show
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Lines matching a regular expression
    Search {
        /// Log file to search
        file: PathBuf,
        /// Regular expression
        #[arg(value_parser = non_empty())]
        pattern: String,
        /// Match case-insensitively
        #[arg(short = 'i', long)]
        ignore_case: bool,
    },
    /// Last lines of a file
    Tail {
        /// Log file to read
        file: PathBuf,
        /// Number of lines
        #[arg(short = 'n', long, default_value_t = 20)]
        lines: usize,
    },
}

impl LogsSubcommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Summary { .. } => "summary",
            Self::Errors { .. } => "errors",
            Self::Search { .. } => "search",
            Self::Tail { .. } => "tail",
        }
    }
}

/// The logs command implementation.
pub struct LogsCommand {
    args: LogsArgs,
}

impl LogsCommand {
    pub fn new(args: LogsArgs) -> Self {
        Self { args }
    }
}

impl Command for LogsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.command {
            LogsSubcommand::Summary { file } => show_summary(file, ui),
            LogsSubcommand::Errors { file, top } => show_errors(file, *top, ui),
            LogsSubcommand::Search {
                file,
                pattern,
                ignore_case,
            } => run_search(file, pattern, *ignore_case, ui),
            LogsSubcommand::Tail { file, lines } => show_tail(file, *lines, ui),
        }
    }
}

fn show_summary(file: &Path, ui: &mut dyn UserInterface) -> Result<CommandResult> {
    let content = read_text(file)?;
    let summary = summarize(&content);

    ui.show_header(&format!("Log summary: {}", file.display()));
    ui.show_field("Lines", &summary.total.to_string());
    ui.show_field("Errors", &summary.errors.to_string());
    ui.show_field("Warnings", &summary.warnings.to_string());
    ui.show_field("Info", &summary.info.to_string());
    ui.show_field("Debug", &summary.debug.to_string());
    ui.show_field("Other", &summary.other.to_string());
    if let Some(rate) = summary.error_rate() {
        ui.show_field("Error rate", &format!("{:.1}%", rate));
    }

    Ok(CommandResult::success(format!(
        "{} lines, {} errors, {} warnings",
        summary.total, summary.errors, summary.warnings
    )))
}

fn show_errors(file: &Path, top: usize, ui: &mut dyn UserInterface) -> Result<CommandResult> {
    let content = read_text(file)?;
    let ranked = top_errors(&content, top);

    if ranked.is_empty() {
        ui.success("No errors found");
        return Ok(CommandResult::success("no errors"));
    }

    ui.show_header(&format!("Top errors: {}", file.display()));
    let mut table = Table::new(&["Count", "Message"]);
    for (message, count) in &ranked {
        table.add_row([count.to_string(), message.clone()]);
    }
    ui.show_table(&table);

    Ok(CommandResult::success(format!(
        "{} distinct error message(s)",
        ranked.len()
    )))
}

fn run_search(
    file: &Path,
    pattern: &str,
    ignore_case: bool,
    ui: &mut dyn UserInterface,
) -> Result<CommandResult> {
    let regex = build_regex(pattern, ignore_case)?;
    let content = read_text(file)?;
    let hits = search(&content, &regex);

    for (line_no, line) in &hits {
        ui.message(&format!("{}: {}", line_no, line));
    }
    if hits.is_empty() {
        ui.warning(&format!("No lines match '{}'", pattern));
    }

    Ok(CommandResult::success(format!(
        "{} match(es) for '{}'",
        hits.len(),
        pattern
    )))
}

fn show_tail(file: &Path, lines: usize, ui: &mut dyn UserInterface) -> Result<CommandResult> {
    let content = read_text(file)?;
    let last = tail(&content, lines);
    for line in &last {
        ui.message(line);
    }
    Ok(CommandResult::success(format!("{} line(s)", last.len())))
}

/// Compile a user-supplied pattern, reporting syntax errors as usage errors.
pub(crate) fn build_regex(pattern: &str, ignore_case: bool) -> Result<Regex> {
    regex::RegexBuilder::new(pattern)
        .case_insensitive(ignore_case)
        .build()
        .map_err(|e| OpsError::Usage {
            argument: "pattern".to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    const LOG: &str = "INFO start\nERROR db down\nWARN slow\nERROR db down\nINFO done\n";

    fn write_log(temp: &TempDir) -> PathBuf {
        let path = temp.path().join("app.log");
        fs::write(&path, LOG).unwrap();
        path
    }

    fn run(command: LogsSubcommand, ui: &mut MockUI) -> Result<CommandResult> {
        LogsCommand::new(LogsArgs { command }).execute(ui)
    }

    #[test]
    fn summary_reports_counts() {
        let temp = TempDir::new().unwrap();
        let file = write_log(&temp);
        let mut ui = MockUI::new();

        let result = run(LogsSubcommand::Summary { file }, &mut ui).unwrap();

        assert!(result.success);
        assert_eq!(ui.field("Errors"), Some("2"));
        assert_eq!(ui.field("Error rate"), Some("40.0%"));
        assert_eq!(result.summary, "5 lines, 2 errors, 1 warnings");
    }

    #[test]
    fn errors_groups_messages() {
        let temp = TempDir::new().unwrap();
        let file = write_log(&temp);
        let mut ui = MockUI::new();

        run(LogsSubcommand::Errors { file, top: 5 }, &mut ui).unwrap();

        assert!(ui.table_contains("│ 2     │ db down │"));
    }

    #[test]
    fn search_prints_line_numbers() {
        let temp = TempDir::new().unwrap();
        let file = write_log(&temp);
        let mut ui = MockUI::new();

        let result = run(
            LogsSubcommand::Search {
                file,
                pattern: "slow".to_string(),
                ignore_case: false,
            },
            &mut ui,
        )
        .unwrap();

        assert_eq!(ui.messages(), &["3: WARN slow"]);
        assert!(result.summary.starts_with("1 match"));
    }

    #[test]
    fn search_rejects_invalid_regex() {
        let temp = TempDir::new().unwrap();
        let file = write_log(&temp);

        let err = run(
            LogsSubcommand::Search {
                file,
                pattern: "(".to_string(),
                ignore_case: false,
            },
            &mut MockUI::new(),
        )
        .unwrap_err();

        assert!(matches!(err, OpsError::Usage { .. }));
    }

    #[test]
    fn tail_shows_last_lines() {
        let temp = TempDir::new().unwrap();
        let file = write_log(&temp);
        let mut ui = MockUI::new();

        run(LogsSubcommand::Tail { file, lines: 2 }, &mut ui).unwrap();

        assert_eq!(ui.messages(), &["ERROR db down", "INFO done"]);
    }

    #[test]
    fn missing_file_is_precondition() {
        let temp = TempDir::new().unwrap();
        let err = run(
            LogsSubcommand::Summary {
                file: temp.path().join("none.log"),
            },
            &mut MockUI::new(),
        )
        .unwrap_err();

        assert!(matches!(err, OpsError::Precondition { .. }));
    }
}
