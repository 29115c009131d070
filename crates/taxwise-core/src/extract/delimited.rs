//! Structured-delimiter extraction.
//!
//! Recognises `Category: ... Suggestion: ... Potential Savings: RM n`
//! blocks in three layouts. Every layout scans the whole text; matches are
//! merged in text order, and a match overlapping one already taken by an
//! earlier layout is discarded. A response may therefore mix layouts.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::Candidate;

/// One field per line, no bullets.
const LINE_SEPARATED: &str = r"(?im)^[ \t]*Category[ \t]*:[ \t]*(?P<category>[^\n]+?)[ \t]*\r?\n[ \t]*Suggestion[ \t]*:[ \t]*(?P<suggestion>[^\n]+?)[ \t]*\r?\n[ \t]*Potential[ \t]+Savings?[ \t]*:[ \t]*(?:RM|MYR)?[ \t]*(?P<amount>\d[\d,]*(?:\.\d+)?)";

/// Dash, asterisk or dot bullets, labels optionally in bold.
const BULLETED: &str = r"(?im)^[ \t]*[-*•][ \t]*\**Category\**[ \t]*:?[ \t]*\**[ \t]*(?P<category>[^\n]+?)[ \t]*\r?\n[ \t]*[-*•][ \t]*\**Suggestion\**[ \t]*:?[ \t]*\**[ \t]*(?P<suggestion>[^\n]+?)[ \t]*\r?\n[ \t]*[-*•][ \t]*\**Potential[ \t]+Savings?\**[ \t]*:?[ \t]*\**[ \t]*(?:RM|MYR)?[ \t]*(?P<amount>\d[\d,]*(?:\.\d+)?)";

/// Anything goes: fields separated by `|`, `;` or line breaks, suggestion
/// text may span several lines.
const INLINE: &str = r"(?is)Category\**\s*[:\-]\s*\**\s*(?P<category>[^|;\n]+?)\s*[|;\n,]\s*[-*•]?\s*\**Suggestion\**\s*[:\-]\s*\**\s*(?P<suggestion>.+?)\s*[|;\n]\s*[-*•]?\s*\**(?:Potential\s+|Estimated\s+)?Savings?\**\s*[:\-]\s*\**\s*(?:RM|MYR)?\s*(?P<amount>\d[\d,]*(?:\.\d+)?)";

/// A blank line or another category label: the suggestion has run into the
/// next block.
static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\n[ \t]*\r?\n|Category\**\s*[:\-]").expect("block break regex is valid")
});

static VARIANTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [LINE_SEPARATED, BULLETED, INLINE]
        .iter()
        .map(|p| Regex::new(p).expect("delimited block regex is valid"))
        .collect()
});

/// Extract every well-formed block, in text order, across all layouts.
pub fn extract(text: &str) -> Vec<Candidate> {
    let mut taken: Vec<(Range<usize>, Option<Candidate>)> = Vec::new();

    for re in VARIANTS.iter() {
        for (span, candidate) in scan(re, text) {
            let overlaps = taken
                .iter()
                .any(|(other, _)| span.start < other.end && other.start < span.end);
            if !overlaps {
                taken.push((span, candidate));
            }
        }
    }

    taken.sort_by_key(|(span, _)| span.start);
    taken.into_iter().filter_map(|(_, candidate)| candidate).collect()
}

/// All matches of one layout with their byte spans.
///
/// A match whose suggestion crosses into the next block is not a block: the
/// search resumes at the break so the following block can still match.
/// Matches with unusable fields keep their span so later layouts cannot
/// reinterpret the same text.
fn scan(re: &Regex, text: &str) -> Vec<(Range<usize>, Option<Candidate>)> {
    let mut out = Vec::new();
    let mut at = 0;

    while let Some(cap) = re.captures_at(text, at) {
        let Some(whole) = cap.get(0) else {
            break;
        };
        let block_break = cap.name("suggestion").and_then(|suggestion| {
            BLOCK_BREAK
                .find(suggestion.as_str())
                .map(|brk| suggestion.start() + brk.start())
        });
        if let Some(resume) = block_break {
            at = resume;
            continue;
        }
        out.push((whole.range(), candidate(&cap)));
        at = whole.end();
    }
    out
}

fn candidate(cap: &Captures<'_>) -> Option<Candidate> {
    Candidate::from_raw(
        cap.name("category")?.as_str(),
        cap.name("suggestion")?.as_str(),
        cap.name("amount")?.as_str(),
    )
}
