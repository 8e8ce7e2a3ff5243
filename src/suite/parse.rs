//! Suite file parsing.
//!
//! One test per line: `name|method|url|expected_status|data`. The data
//! column is optional and may itself contain `|`. Blank lines and lines
//! starting with `#` are skipped.

use crate::http::{ApiRequest, HttpMethod};

/// A runnable test row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// 1-based line number in the suite file.
    pub line: usize,
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub expected_status: u16,
    pub data: Option<String>,
}

impl TestCase {
    /// Request this case sends.
    pub fn request(&self) -> ApiRequest {
        ApiRequest::new(self.method, self.url.clone()).with_body(self.data.clone())
    }
}

/// One eligible line of a suite file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuiteRow {
    Case(TestCase),
    /// A non-comment line that could not be parsed; counted as a failure.
    Malformed { line: usize, reason: String },
}

/// Parse suite content into rows, skipping blanks and comments.
pub fn parse_suite(content: &str) -> Vec<SuiteRow> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                None
            } else {
                Some(parse_row(idx + 1, line))
            }
        })
        .collect()
}

fn parse_row(line: usize, text: &str) -> SuiteRow {
    let fields: Vec<&str> = text.splitn(5, '|').map(str::trim).collect();
    if fields.len() < 4 {
        return SuiteRow::Malformed {
            line,
            reason: format!(
                "expected name|method|url|expected_status[|data], got {} field(s)",
                fields.len()
            ),
        };
    }

    let name = fields[0];
    if name.is_empty() {
        return SuiteRow::Malformed {
            line,
            reason: "test name is empty".to_string(),
        };
    }

    let method = match fields[1].parse::<HttpMethod>() {
        Ok(m) => m,
        Err(reason) => return SuiteRow::Malformed { line, reason },
    };

    let url = fields[2];
    if url.is_empty() {
        return SuiteRow::Malformed {
            line,
            reason: format!("test '{}' has no URL", name),
        };
    }

    let expected_status = match fields[3].parse::<u16>() {
        Ok(code) if (100..=599).contains(&code) => code,
        _ => {
            return SuiteRow::Malformed {
                line,
                reason: format!("invalid expected status '{}'", fields[3]),
            }
        }
    };

    let data = fields
        .get(4)
        .map(|d| d.to_string())
        .filter(|d| !d.is_empty());

    SuiteRow::Case(TestCase {
        line,
        name: name.to_string(),
        method,
        url: url.to_string(),
        expected_status,
        data,
    })
}
