//! Text file commands.
//!
//! Provides `opskit text stats`, `freq`, `extract`, `replace` and `column`.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::analysis::read_text;
use crate::analysis::text::{column, extract, replace_all, stats, word_frequency, ExtractKind};
use crate::error::{OpsError, Result};
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::logs::build_regex;
use super::non_empty;

/// Arguments for the text command.
#[derive(Debug, Clone, Args)]
pub struct TextArgs {
    #[command(subcommand)]
    pub command: TextSubcommand,
}

/// Text subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum TextSubcommand {
    /// Line, word and character counts
    Stats {
        /// File to analyze
        file: PathBuf,
    },
    /// Most frequent words
    Freq {
        /// File to analyze
        file: PathBuf,
        /// How many words to show
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Extract emails, ips, urls or phones
    Extract {
        /// Pattern kind: emails, ips, urls, phones
        kind: ExtractKind,
        /// File to scan
        file: PathBuf,
    },
    /// Replace every match of a regular expression
    Replace {
        /// File to rewrite
        file: PathBuf,
        /// Regular expression
        #[arg(value_parser = non_empty())]
        pattern: String,
        /// Replacement text ($1 refers to capture groups)
        replacement: String,
        /// Write the result back instead of printing it
        #[arg(long)]
        in_place: bool,
    },
    /// Print one delimited column
    Column {
        /// File to read
        file: PathBuf,
        /// Column number, starting at 1
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        index: u32,
        /// Field delimiter
        #[arg(short, long, default_value_t = ',')]
        delimiter: char,
    },
}

impl TextSubcommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stats { .. } => "stats",
            Self::Freq { .. } => "freq",
            Self::Extract { .. } => "extract",
            Self::Replace { .. } => "replace",
            Self::Column { .. } => "column",
        }
    }
}

/// The text command implementation.
pub struct TextCommand {
    args: TextArgs,
}

impl TextCommand {
    pub fn new(args: TextArgs) -> Self {
        Self { args }
    }
}

impl Command for TextCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.command {
            TextSubcommand::Stats { file } => {
                let content = read_text(file)?;
                let s = stats(&content);

                ui.show_header(&format!("Text statistics: {}", file.display()));
                ui.show_field("Lines", &s.lines.to_string());
                ui.show_field("Blank lines", &s.blank_lines.to_string());
                ui.show_field("Words", &s.words.to_string());
                ui.show_field("Characters", &s.chars.to_string());
                ui.show_field("Bytes", &s.bytes.to_string());
                ui.show_field("Longest line", &s.longest_line.to_string());

                Ok(CommandResult::success(format!(
                    "{} lines, {} words, {} chars",
                    s.lines, s.words, s.chars
                )))
            }
            TextSubcommand::Freq { file, top } => {
                let content = read_text(file)?;
                let ranked = word_frequency(&content, *top);

                let mut table = Table::new(&["Word", "Count"]);
                for (word, count) in &ranked {
                    table.add_row([word.clone(), count.to_string()]);
                }
                ui.show_header(&format!("Word frequency: {}", file.display()));
                ui.show_table(&table);

                Ok(CommandResult::success(format!("{} word(s)", ranked.len())))
            }
            TextSubcommand::Extract { kind, file } => {
                let content = read_text(file)?;
                let found = extract(&content, *kind);
                for item in &found {
                    ui.message(item);
                }
                if found.is_empty() {
                    ui.warning(&format!("No {} found", kind));
                }
                Ok(CommandResult::success(format!("{} {} found", found.len(), kind)))
            }
            TextSubcommand::Replace {
                file,
                pattern,
                replacement,
                in_place,
            } => {
                let regex = build_regex(pattern, false)?;
                let content = read_text(file)?;
                let (updated, count) = replace_all(&content, &regex, replacement);

                if *in_place {
                    fs::write(file, &updated)?;
                    ui.success(&format!(
                        "Replaced {} occurrence(s) in {}",
                        count,
                        file.display()
                    ));
                } else {
                    for line in updated.lines() {
                        ui.message(line);
                    }
                }

                Ok(CommandResult::success(format!("{} replacement(s)", count)))
            }
            TextSubcommand::Column {
                file,
                index,
                delimiter,
            } => {
                let index = usize::try_from(*index).map_err(|_| OpsError::Usage {
                    argument: "index".to_string(),
                    message: "column index out of range".to_string(),
                })?;
                let content = read_text(file)?;
                let values = column(&content, index, *delimiter);
                for value in &values {
                    ui.message(value);
                }
                Ok(CommandResult::success(format!(
                    "column {} of {} line(s)",
                    index,
                    values.len()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn run(command: TextSubcommand, ui: &mut MockUI) -> Result<CommandResult> {
        TextCommand::new(TextArgs { command }).execute(ui)
    }

    fn write(temp: &TempDir, content: &str) -> PathBuf {
        let path = temp.path().join("input.txt");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn stats_reports_fields() {
        let temp = TempDir::new().unwrap();
        let file = write(&temp, "one two\n\nthree\n");
        let mut ui = MockUI::new();

        let result = run(TextSubcommand::Stats { file }, &mut ui).unwrap();

        assert_eq!(ui.field("Lines"), Some("3"));
        assert_eq!(ui.field("Blank lines"), Some("1"));
        assert_eq!(result.summary, "3 lines, 3 words, 15 chars");
    }

    #[test]
    fn freq_ranks_words() {
        let temp = TempDir::new().unwrap();
        let file = write(&temp, "b a b c b a\n");
        let mut ui = MockUI::new();

        run(TextSubcommand::Freq { file, top: 2 }, &mut ui).unwrap();

        assert!(ui.table_contains("│ b    │ 3     │"));
        assert!(ui.table_contains("│ a    │ 2     │"));
        assert!(!ui.table_contains("│ c "));
    }

    #[test]
    fn extract_lists_emails() {
        let temp = TempDir::new().unwrap();
        let file = write(&temp, "mail ops@example.com or ops@example.com, dev@example.org\n");
        let mut ui = MockUI::new();

        let result = run(
            TextSubcommand::Extract {
                kind: ExtractKind::Emails,
                file,
            },
            &mut ui,
        )
        .unwrap();

        assert_eq!(ui.messages(), &["ops@example.com", "dev@example.org"]);
        assert_eq!(result.summary, "2 emails found");
    }

    #[test]
    fn replace_prints_without_touching_file() {
        let temp = TempDir::new().unwrap();
        let file = write(&temp, "host=old\nport=1\n");
        let mut ui = MockUI::new();

        run(
            TextSubcommand::Replace {
                file: file.clone(),
                pattern: "old".to_string(),
                replacement: "new".to_string(),
                in_place: false,
            },
            &mut ui,
        )
        .unwrap();

        assert!(ui.has_message("host=new"));
        assert_eq!(fs::read_to_string(&file).unwrap(), "host=old\nport=1\n");
    }

    #[test]
    fn replace_in_place_rewrites_file() {
        let temp = TempDir::new().unwrap();
        let file = write(&temp, "v1 v2 v3\n");
        let mut ui = MockUI::new();

        let result = run(
            TextSubcommand::Replace {
                file: file.clone(),
                pattern: r"v(\d)".to_string(),
                replacement: "version$1".to_string(),
                in_place: true,
            },
            &mut ui,
        )
        .unwrap();

        assert_eq!(result.summary, "3 replacement(s)");
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "version1 version2 version3\n"
        );
    }

    #[test]
    fn column_prints_field() {
        let temp = TempDir::new().unwrap();
        let file = write(&temp, "a,b,c\nd,e\nf\n");
        let mut ui = MockUI::new();

        run(
            TextSubcommand::Column {
                file,
                index: 2,
                delimiter: ',',
            },
            &mut ui,
        )
        .unwrap();

        assert_eq!(ui.messages(), &["b", "e", ""]);
    }
}
