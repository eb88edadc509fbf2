//! Line-oriented INI parser.
//!
//! Comments (`#` or `;` up to end of line) are discarded, so they never
//! survive a load/save cycle. Lines without `=` that are not section headers
//! are collected as [`MalformedLine`]s and skipped.

use std::collections::HashMap;

/// Section name -> key -> value.
pub type Sections = HashMap<String, HashMap<String, String>>;

/// A line that was neither a section header nor a `key = value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number in the source text.
    pub line_number: usize,
    /// The line after comment stripping and trimming.
    pub content: String,
}

/// Result of parsing INI text.
#[derive(Debug, Clone, Default)]
pub struct ParsedConfig {
    pub sections: Sections,
    pub malformed: Vec<MalformedLine>,
}

/// Parse INI text into sections.
///
/// Keys that appear before any `[section]` header land in the section named
/// `""`. A repeated header resumes the existing section instead of replacing it.
pub fn parse_str(content: &str) -> ParsedConfig {
    let mut parsed = ParsedConfig::default();
    let mut current_section = String::new();

    for (index, raw_line) in content.lines().enumerate() {
        let line = trim(strip_comment(raw_line));
        if line.is_empty() {
            continue;
        }

        if let Some(name) = section_header(line) {
            current_section = trim(name).to_string();
            continue;
        }

        let Some((key, raw_value)) = line.split_once('=') else {
            parsed.malformed.push(MalformedLine {
                line_number: index + 1,
                content: line.to_string(),
            });
            continue;
        };

        parsed
            .sections
            .entry(current_section.clone())
            .or_default()
            .insert(trim(key).to_string(), normalize_value(raw_value));
    }

    parsed
}

/// Cut the line at the first `#` or `;`.
fn strip_comment(line: &str) -> &str {
    match line.find(['#', ';']) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn section_header(line: &str) -> Option<&str> {
    line.strip_prefix('[')?.strip_suffix(']')
}

// An all-space value (including an empty one) collapses to a single space so
// "explicitly blank" stays distinguishable from a missing key. Tabs are not
// part of that check and trim away to "".
fn normalize_value(raw: &str) -> String {
    if raw.chars().all(|c| c == ' ') {
        " ".to_string()
    } else {
        trim(raw).to_string()
    }
}

/// Trim spaces and tabs only; other whitespace is kept.
fn trim(s: &str) -> &str {
    s.trim_matches(|c: char| c == ' ' || c == '\t')
}
