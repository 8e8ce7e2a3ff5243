//! Log file analysis.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// Severity a log line is classified under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Debug,
    Other,
}

fn level_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(FATAL|CRITICAL|ERROR|ERR|WARNING|WARN|INFO|DEBUG|TRACE)\b")
            .expect("static regex")
    })
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static regex"))
}

/// Classify one line by the first level keyword it contains.
pub fn classify(line: &str) -> Severity {
    match level_regex().find(line) {
        Some(m) => match m.as_str().to_uppercase().as_str() {
            "FATAL" | "CRITICAL" | "ERROR" | "ERR" => Severity::Error,
            "WARNING" | "WARN" => Severity::Warning,
            "INFO" => Severity::Info,
            _ => Severity::Debug,
        },
        None => Severity::Other,
    }
}

/// Line counts per severity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub debug: usize,
    pub other: usize,
}

impl LogSummary {
    /// Share of lines that are errors, as a percentage.
    pub fn error_rate(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.errors as f64 * 100.0 / self.total as f64)
        }
    }
}

/// Count lines per severity; blank lines are ignored.
pub fn summarize(content: &str) -> LogSummary {
    let mut summary = LogSummary::default();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        summary.total += 1;
        match classify(line) {
            Severity::Error => summary.errors += 1,
            Severity::Warning => summary.warnings += 1,
            Severity::Info => summary.info += 1,
            Severity::Debug => summary.debug += 1,
            Severity::Other => summary.other += 1,
        }
    }
    summary
}

/// Message text after the level keyword, with digits collapsed to `N` so
/// lines differing only in ids or timings group together.
fn error_signature(line: &str) -> String {
    let rest = match level_regex().find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    };
    let rest = rest.trim_start_matches([']', ':', ' ', '-', '\t']).trim();
    number_regex().replace_all(rest, "N").to_string()
}

/// Most frequent error messages, most common first.
pub fn top_errors(content: &str, limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for line in content.lines() {
        if classify(line) == Severity::Error {
            *counts.entry(error_signature(line)).or_default() += 1;
        }
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Lines matching `pattern` with their 1-based line numbers.
pub fn search<'a>(content: &'a str, pattern: &Regex) -> Vec<(usize, &'a str)> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| pattern.is_match(line))
        .map(|(idx, line)| (idx + 1, line))
        .collect()
}

/// The last `count` lines.
pub fn tail(content: &str, count: usize) -> Vec<&str> {
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
2024-01-01 10:00:00 INFO server started
2024-01-01 10:00:01 DEBUG config loaded
2024-01-01 10:00:02 WARN disk usage 85%
2024-01-01 10:00:03 ERROR connection to db-1 failed after 3000ms
2024-01-01 10:00:04 ERROR connection to db-2 failed after 3012ms
2024-01-01 10:00:05 [error] cache miss storm

plain line without level
";

    #[test]
    fn classify_levels() {
        assert_eq!(classify("x FATAL y"), Severity::Error);
        assert_eq!(classify("[warning] x"), Severity::Warning);
        assert_eq!(classify("INFO"), Severity::Info);
        assert_eq!(classify("trace: z"), Severity::Debug);
        assert_eq!(classify("INFORMATION overload"), Severity::Other);
        assert_eq!(classify("nothing here"), Severity::Other);
    }

    #[test]
    fn summarize_counts() {
        let summary = summarize(SAMPLE);

        assert_eq!(
            summary,
            LogSummary {
                total: 7,
                errors: 3,
                warnings: 1,
                info: 1,
                debug: 1,
                other: 1,
            }
        );
        assert_eq!(summary.error_rate().map(|r| r.round()), Some(43.0));
    }

    #[test]
    fn empty_log_has_no_error_rate() {
        assert_eq!(summarize("").error_rate(), None);
    }

    #[test]
    fn top_errors_groups_by_signature() {
        let top = top_errors(SAMPLE, 10);

        assert_eq!(top[0], ("connection to db-N failed after Nms".to_string(), 2));
        assert_eq!(top[1], ("cache miss storm".to_string(), 1));
    }

    #[test]
    fn top_errors_respects_limit() {
        assert_eq!(top_errors(SAMPLE, 1).len(), 1);
        assert!(top_errors(SAMPLE, 0).is_empty());
    }

    #[test]
    fn search_returns_line_numbers() {
        let re = Regex::new("db-\\d").unwrap();
        let hits = search(SAMPLE, &re);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, 4);
    }

    #[test]
    fn tail_handles_short_input() {
        assert_eq!(tail("a\nb\nc", 2), vec!["b", "c"]);
        assert_eq!(tail("a", 5), vec!["a"]);
        assert!(tail("", 3).is_empty());
    }
}
