//! Table rendering for formatted output.

/// A box-drawn table.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    column_widths: Vec<usize>,
}

fn width(cell: &str) -> usize {
    cell.chars().count()
}

impl Table {
    /// Create a new table with the given headers.
    pub fn new(headers: &[&str]) -> Self {
        let headers: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        let column_widths = headers.iter().map(|h| width(h)).collect();

        Self {
            headers,
            rows: Vec::new(),
            column_widths,
        }
    }

    /// Add a row. Cells beyond the header count are dropped.
    pub fn add_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = row.into_iter().map(Into::into).collect();
        row.truncate(self.headers.len());

        for (i, cell) in row.iter().enumerate() {
            self.column_widths[i] = self.column_widths[i].max(width(cell));
        }

        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as a string (no trailing newline).
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 4);
        lines.push(self.render_border('┌', '┬', '┐'));
        lines.push(self.render_row(&self.headers));
        lines.push(self.render_border('├', '┼', '┤'));
        for row in &self.rows {
            lines.push(self.render_row(row));
        }
        lines.push(self.render_border('└', '┴', '┘'));
        lines.join("\n")
    }

    fn render_border(&self, left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = self
            .column_widths
            .iter()
            .map(|w| "─".repeat(w + 2))
            .collect();
        format!("{}{}{}", left, segments.join(&mid.to_string()), right)
    }

    fn render_row(&self, row: &[String]) -> String {
        let mut s = String::from("│");
        for (i, w) in self.column_widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            let pad = w - width(cell);
            s.push(' ');
            s.push_str(cell);
            s.push_str(&" ".repeat(pad));
            s.push_str(" │");
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_empty() {
        let table = Table::new(&["A", "B"]);
        assert!(table.is_empty());

        let output = table.render();
        assert!(output.contains("│ A │ B │"));
    }

    #[test]
    fn table_with_rows() {
        let mut table = Table::new(&["Name", "Status"]);
        table.add_row(["nginx", "running"]);
        table.add_row(vec!["redis".to_string(), "exited".to_string()]);

        assert_eq!(table.row_count(), 2);
        let output = table.render();
        assert!(output.contains("│ nginx │ running │"));
        assert!(output.contains("│ redis │ exited  │"));
    }

    #[test]
    fn table_pads_unicode_by_chars() {
        let mut table = Table::new(&["Check"]);
        table.add_row(["✓ ok"]);
        table.add_row(["plain"]);

        let output = table.render();
        assert!(output.contains("│ ✓ ok  │"));
    }

    #[test]
    fn table_handles_missing_and_extra_cells() {
        let mut table = Table::new(&["A", "B"]);
        table.add_row(["only"]);
        table.add_row(["1", "2", "3"]);

        let output = table.render();
        assert!(output.contains("│ only │   │"));
        assert!(!output.contains('3'));
    }

    #[test]
    fn table_render_line_count() {
        let mut table = Table::new(&["Col1", "Col2", "Col3"]);
        table.add_row(["a", "b", "c"]);
        table.add_row(["d", "e", "f"]);

        let output = table.render();
        assert_eq!(output.lines().count(), 6);
        assert!(output.starts_with('┌'));
        assert!(output.ends_with('┘'));
    }
}
