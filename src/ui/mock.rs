//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. Confirmation answers can be queued.
//!
//! # Example
//!
//! ```
//! use opskit::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.queue_confirm(false);
//!
//! ui.message("Checking disk");
//! assert!(!ui.confirm("Remove images?", true).unwrap());
//!
//! assert!(ui.has_message("Checking disk"));
//! assert_eq!(ui.confirms_shown(), &["Remove images?"]);
//! ```

use std::collections::VecDeque;

use crate::error::Result;

use super::{OutputMode, SpinnerHandle, Table, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    fields: Vec<(String, String)>,
    tables: Vec<Table>,
    hints: Vec<String>,
    error_blocks: Vec<(String, String, Option<String>)>,
    spinners: Vec<String>,
    confirm_answers: VecDeque<bool>,
    confirms_shown: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Queue the answer for the next `confirm` call.
    ///
    /// With the queue empty, `confirm` returns the question's default.
    pub fn queue_confirm(&mut self, answer: bool) {
        self.confirm_answers.push_back(answer);
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// Captured error blocks as (command, output, hint).
    pub fn error_blocks(&self) -> &[(String, String, Option<String>)] {
        &self.error_blocks
    }

    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    pub fn confirms_shown(&self) -> &[String] {
        &self.confirms_shown
    }

    /// Check if any message contains `msg`.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    /// Value shown for field `key`, if any.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check if any rendered table contains `text`.
    pub fn table_contains(&self, text: &str) -> bool {
        self.tables.iter().any(|t| t.render().contains(text))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_field(&mut self, key: &str, value: &str) {
        self.fields.push((key.to_string(), value.to_string()));
    }

    fn show_table(&mut self, table: &Table) {
        self.tables.push(table.clone());
    }

    fn show_hint(&mut self, hint: &str) {
        self.hints.push(hint.to_string());
    }

    fn show_error_block(&mut self, command: &str, output: &str, hint: Option<&str>) {
        self.error_blocks.push((
            command.to_string(),
            output.to_string(),
            hint.map(|h| h.to_string()),
        ));
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        self.confirms_shown.push(question.to_string());
        Ok(self.confirm_answers.pop_front().unwrap_or(default))
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner::new())
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Mock spinner that captures finish messages.
#[derive(Debug, Default)]
pub struct MockSpinner {
    messages: Vec<String>,
    finish_message: Option<String>,
    status: Option<SpinnerStatus>,
}

/// Status of a mock spinner when finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerStatus {
    Success,
    Error,
    Cleared,
}

impl MockSpinner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn finish_message(&self) -> Option<&str> {
        self.finish_message.as_deref()
    }

    pub fn status(&self) -> Option<SpinnerStatus> {
        self.status
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        self.finish_message = Some(msg.to_string());
        self.status = Some(SpinnerStatus::Success);
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish_message = Some(msg.to_string());
        self.status = Some(SpinnerStatus::Error);
    }

    fn finish_clear(&mut self) {
        self.status = Some(SpinnerStatus::Cleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_ui_captures_messages() {
        let mut ui = MockUI::new();

        ui.message("Hello");
        ui.success("Done");
        ui.warning("Be careful");
        ui.error("Oops");

        assert_eq!(ui.messages(), &["Hello"]);
        assert_eq!(ui.successes(), &["Done"]);
        assert_eq!(ui.warnings(), &["Be careful"]);
        assert_eq!(ui.errors(), &["Oops"]);
    }

    #[test]
    fn confirm_uses_queue_then_default() {
        let mut ui = MockUI::new();
        ui.queue_confirm(false);

        assert!(!ui.confirm("First?", true).unwrap());
        assert!(ui.confirm("Second?", true).unwrap());
        assert!(!ui.confirm("Third?", false).unwrap());
        assert_eq!(ui.confirms_shown().len(), 3);
    }

    #[test]
    fn fields_and_tables_are_queryable() {
        let mut ui = MockUI::new();
        ui.show_field("Total", "8 GiB");
        let mut table = Table::new(&["Name"]);
        table.add_row(["web"]);
        ui.show_table(&table);

        assert_eq!(ui.field("Total"), Some("8 GiB"));
        assert_eq!(ui.field("Free"), None);
        assert!(ui.table_contains("web"));
    }

    #[test]
    fn error_block_captured() {
        let mut ui = MockUI::new();
        ui.show_error_block("git push", "rejected", Some("pull first"));

        assert_eq!(
            ui.error_blocks(),
            &[(
                "git push".to_string(),
                "rejected".to_string(),
                Some("pull first".to_string())
            )]
        );
    }

    #[test]
    fn mock_spinner_records_status() {
        let mut spinner = MockSpinner::new();
        spinner.set_message("step");
        spinner.finish_error("boom");

        assert_eq!(spinner.messages(), &["step"]);
        assert_eq!(spinner.finish_message(), Some("boom"));
        assert_eq!(spinner.status(), Some(SpinnerStatus::Error));
    }

    #[test]
    fn start_spinner_is_recorded() {
        let mut ui = MockUI::with_mode(OutputMode::Quiet);
        let mut spinner = ui.start_spinner("Pinging");
        spinner.finish_clear();

        assert_eq!(ui.spinners(), &["Pinging"]);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }
}
