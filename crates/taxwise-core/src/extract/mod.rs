//! Response extraction: raw model text to candidate suggestions.
//!
//! Strategies run in order and the first one that yields at least one
//! candidate wins:
//!
//! 1. [`delimited`] -- `Category: / Suggestion: / Potential Savings:` blocks
//!    matched by regex, in three layout variants merged in text order.
//! 2. [`lines`] -- a line-oriented state machine for looser layouts.
//!
//! The reported total is extracted independently of which strategy
//! succeeded. It is informational only; the repair stage never trusts it.

pub mod delimited;
pub mod lines;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// An extracted (category, suggestion text, saving) triple, before
/// validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub category: String,
    pub suggestion_text: String,
    pub potential_saving: f64,
}

impl Candidate {
    pub fn new(
        category: impl Into<String>,
        suggestion_text: impl Into<String>,
        potential_saving: f64,
    ) -> Self {
        Self {
            category: category.into(),
            suggestion_text: suggestion_text.into(),
            potential_saving,
        }
    }

    /// Build a candidate from raw captured fields.
    ///
    /// Returns `None` when either text field is empty after cleanup or the
    /// amount is not a positive number.
    pub(crate) fn from_raw(category: &str, suggestion: &str, amount: &str) -> Option<Self> {
        let category = clean_field(category);
        let suggestion_text = clean_field(suggestion);
        if category.is_empty() || suggestion_text.is_empty() {
            return None;
        }
        let potential_saving = parse_amount(amount)?;
        Some(Self {
            category,
            suggestion_text,
            potential_saving,
        })
    }
}

/// Which strategy produced the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Delimited,
    LineParser,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Delimited => "delimited",
            Self::LineParser => "line_parser",
        };
        f.write_str(s)
    }
}

/// Result of running the extraction cascade over one response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub candidates: Vec<Candidate>,
    /// "Total ... RM n" figure found anywhere in the text.
    pub reported_total: Option<f64>,
    /// `None` when no strategy produced candidates.
    pub strategy: Option<Strategy>,
}

type StrategyFn = fn(&str) -> Vec<Candidate>;

/// The cascade, in priority order.
const STRATEGIES: &[(Strategy, StrategyFn)] = &[
    (Strategy::Delimited, delimited::extract),
    (Strategy::LineParser, lines::extract),
];

/// Run the extraction cascade over `text`.
pub fn extract(text: &str) -> Extraction {
    let reported_total = extract_total(text);

    for (strategy, run) in STRATEGIES {
        let candidates = run(text);
        if !candidates.is_empty() {
            tracing::debug!(
                strategy = %strategy,
                count = candidates.len(),
                "extracted candidates"
            );
            return Extraction {
                candidates,
                reported_total,
                strategy: Some(*strategy),
            };
        }
    }

    Extraction {
        candidates: Vec::new(),
        reported_total,
        strategy: None,
    }
}

const AMOUNT: &str = r"(?P<amount>\d[\d,]*(?:\.\d+)?)";

static TOTAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(
            r"(?i)total\s+(?:(?:potential|estimated|tax|annual)\s+)*savings?\s*(?:of|is|[:=\-])?\s*\**\s*(?:RM|MYR)\s*{AMOUNT}"
        ),
        format!(r"(?i)total\s*[:=\-]\s*\**\s*(?:RM|MYR)\s*{AMOUNT}"),
        format!(r"(?i)total[^\n]{{0,80}}?(?:RM|MYR)\s*{AMOUNT}"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("total savings regex is valid"))
    .collect()
});

/// Find a "Total ... RM n" figure in `text`.
///
/// Phrasings are tried in order of specificity and the first pattern with
/// a usable amount wins, so the figure returned is the first match of the
/// most specific phrasing, not necessarily the first total in the text.
pub fn extract_total(text: &str) -> Option<f64> {
    TOTAL_PATTERNS.iter().find_map(|re| {
        re.captures_iter(text)
            .find_map(|cap| cap.name("amount").and_then(|m| parse_amount(m.as_str())))
    })
}

/// Parse a currency amount such as `RM 1,250.50`.
///
/// Strips currency markers, thousands separators and whitespace. Returns
/// `None` for non-numeric, non-finite, zero or negative values.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut cleaned = raw.trim().to_ascii_uppercase();
    for marker in ["MYR", "RM"] {
        cleaned = cleaned.replace(marker, "");
    }
    cleaned.retain(|c| c != ',' && !c.is_whitespace());
    let cleaned = cleaned.trim_end_matches('.');
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Some(value),
        _ => None,
    }
}

/// Trim whitespace and markdown emphasis from a captured field.
pub(crate) fn clean_field(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '`' | '"'))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
