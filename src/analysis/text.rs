//! Text processing: statistics, word frequency, pattern extraction.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

/// Basic counts for a text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStats {
    pub lines: usize,
    pub words: usize,
    pub chars: usize,
    pub bytes: usize,
    pub blank_lines: usize,
    pub longest_line: usize,
}

pub fn stats(content: &str) -> TextStats {
    let mut stats = TextStats {
        bytes: content.len(),
        chars: content.chars().count(),
        words: content.split_whitespace().count(),
        ..Default::default()
    };
    for line in content.lines() {
        stats.lines += 1;
        if line.trim().is_empty() {
            stats.blank_lines += 1;
        }
        stats.longest_line = stats.longest_line.max(line.chars().count());
    }
    stats
}

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\p{L}\p{N}']+").expect("static regex"))
}

/// Case-insensitive word counts, most frequent first (ties alphabetical).
pub fn word_frequency(content: &str, limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for m in word_regex().find_iter(content) {
        let word = m.as_str().trim_matches('\'').to_lowercase();
        if !word.is_empty() {
            *counts.entry(word).or_default() += 1;
        }
    }
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Patterns `text extract` knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractKind {
    Emails,
    Ips,
    Urls,
    Phones,
}

impl ExtractKind {
    fn regex(&self) -> &'static Regex {
        static EMAIL: OnceLock<Regex> = OnceLock::new();
        static IP: OnceLock<Regex> = OnceLock::new();
        static URL: OnceLock<Regex> = OnceLock::new();
        static PHONE: OnceLock<Regex> = OnceLock::new();
        match self {
            Self::Emails => EMAIL.get_or_init(|| {
                Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("static regex")
            }),
            Self::Ips => IP.get_or_init(|| {
                Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("static regex")
            }),
            Self::Urls => URL.get_or_init(|| {
                Regex::new(r#"https?://[^\s<>"')\]]+"#).expect("static regex")
            }),
            Self::Phones => PHONE.get_or_init(|| {
                Regex::new(r"\(?\b\d{3}\)?[-. ]?\d{3}[-. ]\d{4}\b").expect("static regex")
            }),
        }
    }

    fn accepts(&self, candidate: &str) -> bool {
        match self {
            // The regex admits 999.1.1.1; require real octets.
            Self::Ips => candidate.parse::<std::net::Ipv4Addr>().is_ok(),
            _ => true,
        }
    }
}

impl fmt::Display for ExtractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Emails => "emails",
            Self::Ips => "ips",
            Self::Urls => "urls",
            Self::Phones => "phones",
        })
    }
}

impl FromStr for ExtractKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" | "emails" => Ok(Self::Emails),
            "ip" | "ips" => Ok(Self::Ips),
            "url" | "urls" => Ok(Self::Urls),
            "phone" | "phones" => Ok(Self::Phones),
            _ => Err(format!(
                "unknown pattern '{}' (expected emails, ips, urls or phones)",
                s
            )),
        }
    }
}

/// Distinct matches in first-seen order.
pub fn extract(content: &str, kind: ExtractKind) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    kind.regex()
        .find_iter(content)
        .map(|m| m.as_str().trim_end_matches(['.', ',']).to_string())
        .filter(|m| kind.accepts(m))
        .filter(|m| seen.insert(m.clone()))
        .collect()
}

/// Replace every match of `pattern`, returning the new text and the count.
pub fn replace_all(content: &str, pattern: &Regex, replacement: &str) -> (String, usize) {
    let count = pattern.find_iter(content).count();
    (pattern.replace_all(content, replacement).to_string(), count)
}

/// Field `index` (1-based) of every line split on `delimiter`.
///
/// Lines with fewer fields yield an empty string so row alignment is kept.
pub fn column(content: &str, index: usize, delimiter: char) -> Vec<String> {
    content
        .lines()
        .map(|line| {
            index
                .checked_sub(1)
                .and_then(|i| line.split(delimiter).nth(i))
                .map(|f| f.trim().to_string())
                .unwrap_or_default()
        })
        .collect()
}
