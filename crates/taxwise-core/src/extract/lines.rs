//! Line-oriented extraction for loosely formatted responses.
//!
//! Walks the text one line at a time through a small state machine:
//!
//! ```text
//! Idle --Category--> HaveCategory --Suggestion--> HaveSuggestion --Savings(>0)--> Complete
//!  ^                                                   |  ^                          |
//!  |                                                   +--+ (continuation lines)     |
//!  +------------------------ Category (flushes Complete) -----------------------------+
//! ```
//!
//! Bullets, numbering and markdown emphasis in front of a keyword are
//! ignored. A completed candidate is emitted when the next record starts or
//! the text ends.

use std::sync::LazyLock;

use regex::Regex;

use super::{Candidate, clean_field, parse_amount};

const CATEGORY_KEYWORDS: &[&str] = &["relief category", "category"];

const SUGGESTION_KEYWORDS: &[&str] = &["suggestion", "recommendation", "advice", "action"];

const SAVINGS_KEYWORDS: &[&str] = &[
    "potential savings",
    "potential saving",
    "estimated savings",
    "estimated saving",
    "tax savings",
    "tax saving",
    "savings",
    "saving",
];

/// Summary lines never continue a suggestion.
const SUMMARY_KEYWORDS: &[&str] = &["total"];

static LINE_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:RM|MYR)?\s*(?P<amount>-?\d[\d,]*(?:\.\d+)?)")
        .expect("line amount regex is valid")
});

#[derive(Debug)]
enum State {
    Idle,
    HaveCategory { category: String },
    HaveSuggestion { category: String, text: String },
    Complete(Candidate),
}

#[derive(Debug, PartialEq)]
enum Line<'a> {
    Category(&'a str),
    Suggestion(&'a str),
    Savings(&'a str),
    Summary,
    Other(&'a str),
    Blank,
}

/// Extract candidates line by line.
pub fn extract(text: &str) -> Vec<Candidate> {
    let mut out = Vec::new();
    let mut state = State::Idle;

    for raw in text.lines() {
        state = step(state, classify(raw), &mut out);
    }
    if let State::Complete(candidate) = state {
        out.push(candidate);
    }
    out
}

fn step(state: State, line: Line<'_>, out: &mut Vec<Candidate>) -> State {
    match (state, line) {
        (State::Complete(candidate), Line::Category(value)) => {
            out.push(candidate);
            start_record(value)
        }
        (_, Line::Category(value)) => start_record(value),

        (State::HaveCategory { category }, Line::Suggestion(value))
        | (State::HaveSuggestion { category, .. }, Line::Suggestion(value)) => {
            State::HaveSuggestion {
                category,
                text: clean_field(value),
            }
        }

        (State::HaveSuggestion { category, text }, Line::Savings(value)) => {
            match saving_amount(value) {
                Some(amount) if !text.is_empty() => {
                    State::Complete(Candidate::new(category, text, amount))
                }
                _ => State::HaveSuggestion { category, text },
            }
        }

        (State::HaveSuggestion { category, mut text }, Line::Other(value)) => {
            let more = clean_field(value);
            if !more.is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&more);
            }
            State::HaveSuggestion { category, text }
        }

        (state, _) => state,
    }
}

fn start_record(value: &str) -> State {
    let category = clean_field(value);
    if category.is_empty() {
        State::Idle
    } else {
        State::HaveCategory { category }
    }
}

fn saving_amount(value: &str) -> Option<f64> {
    LINE_AMOUNT
        .captures(value)
        .and_then(|cap| cap.name("amount"))
        .and_then(|m| parse_amount(m.as_str()))
}

fn classify(raw: &str) -> Line<'_> {
    let line = strip_decoration(raw);
    if line.is_empty() {
        return Line::Blank;
    }
    if let Some(value) = keyword_value(line, CATEGORY_KEYWORDS) {
        return Line::Category(value);
    }
    if let Some(value) = keyword_value(line, SUGGESTION_KEYWORDS) {
        return Line::Suggestion(value);
    }
    if let Some(value) = keyword_value(line, SAVINGS_KEYWORDS) {
        return Line::Savings(value);
    }
    let lower = line.to_ascii_lowercase();
    if SUMMARY_KEYWORDS.iter().any(|kw| lower.starts_with(kw)) {
        return Line::Summary;
    }
    Line::Other(line)
}

/// Drop leading bullets, list numbering, headings and emphasis markers.
fn strip_decoration(raw: &str) -> &str {
    let line = raw.trim_start_matches(|c: char| {
        c.is_whitespace() || matches!(c, '-' | '*' | '•' | '#' | '>' | '_')
    });
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let line = if digits > 0 {
        let rest = &line[digits..];
        match rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            Some(after) => after,
            None => line,
        }
    } else {
        line
    };
    line.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_'))
        .trim_end()
}

/// If `line` starts with one of `keywords` followed by a separator, return
/// the text after the separator.
fn keyword_value<'a>(line: &'a str, keywords: &[&str]) -> Option<&'a str> {
    for kw in keywords {
        let Some(head) = line.get(..kw.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(kw) {
            continue;
        }
        let rest = line[kw.len()..].trim_start_matches(|c: char| matches!(c, '*' | '_' | ' ' | '\t'));
        for sep in [':', '-', '–', '='] {
            if let Some(value) = rest.strip_prefix(sep) {
                return Some(value.trim());
            }
        }
    }
    None
}
