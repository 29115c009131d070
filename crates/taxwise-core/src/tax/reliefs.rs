//! Relief base-amount table.
//!
//! The single authoritative mapping from relief category to its canonical
//! base deductible amount. Category names coming from model output are
//! normalized (case, punctuation, whitespace) and folded through aliases
//! and keywords, so "EPF", "EPF Contribution" and "KWSP" all resolve to the
//! same [`Relief`].
//!
//! An estimate is `base * marginal rate`, bounded to the per-suggestion
//! sanity range `(0, income * MAX_SAVING_SHARE]`.

use std::fmt::Write as _;

use super::rates::rate_for;
use super::{MAX_SAVING_SHARE, MIN_SAVING_SHARE};

/// How a relief's base amount is derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReliefBase {
    /// A fixed ringgit ceiling.
    Fixed(f64),
    /// A share of the person's income (business-scaled categories).
    IncomeShare(f64),
}

/// One relief category.
#[derive(Debug)]
pub struct Relief {
    /// Canonical display name.
    pub name: &'static str,
    pub base: ReliefBase,
    /// Normalized names that resolve to this relief exactly.
    aliases: &'static [&'static str],
    /// Normalized word sequences that identify this relief inside a longer
    /// category label. Scanned in table order, so more specific reliefs
    /// come first.
    keywords: &'static [&'static str],
    /// Suggestion text used when the relief is synthesized rather than
    /// extracted.
    pub advice: &'static str,
}

impl Relief {
    /// Base deductible amount for a person earning `income`.
    pub fn base_amount(&self, income: f64) -> f64 {
        match self.base {
            ReliefBase::Fixed(amount) => amount,
            ReliefBase::IncomeShare(share) => income * share,
        }
    }

    /// Saving estimate for this relief at `income`.
    pub fn estimate(&self, income: f64) -> f64 {
        bounded(self.base_amount(income) * rate_for(income), income)
    }
}

pub const LIFESTYLE: &str = "Lifestyle Relief";
pub const MEDICAL: &str = "Medical Relief";
pub const EPF: &str = "EPF Contribution";
pub const INSURANCE: &str = "Insurance Premium";
pub const SSPN: &str = "SSPN Savings";
pub const SOCSO: &str = "SOCSO Contribution";
pub const EDUCATION: &str = "Education Relief";
pub const DONATION: &str = "Donation";
pub const BUSINESS_EXPENSES: &str = "Business Expenses";
pub const HOME_OFFICE: &str = "Home Office";
pub const LONG_TERM_INVESTMENT: &str = "Long-term Investment";
pub const RETIREMENT_PRS: &str = "Retirement Planning (PRS)";
pub const CAPITAL_INVESTMENT: &str = "Capital Investment";
pub const BUSINESS_STRUCTURE: &str = "Business Structure";

static RELIEFS: &[Relief] = &[
    Relief {
        name: SSPN,
        base: ReliefBase::Fixed(8_000.0),
        aliases: &["sspn", "sspn savings", "sspn i", "sspn i plus"],
        keywords: &["sspn", "national education savings"],
        advice: "Deposit into an SSPN account for your children's education; \
                 net yearly deposits are deductible.",
    },
    Relief {
        name: SOCSO,
        base: ReliefBase::Fixed(350.0),
        aliases: &["socso", "perkeso", "socso contribution"],
        keywords: &["socso", "perkeso", "employment insurance"],
        advice: "Claim your SOCSO and EIS contributions shown on your EA form.",
    },
    Relief {
        name: EPF,
        base: ReliefBase::Fixed(4_000.0),
        aliases: &["epf", "kwsp", "epf contribution", "epf contributions"],
        keywords: &["epf", "kwsp", "provident fund"],
        advice: "Top up EPF with voluntary contributions to use the full \
                 statutory contribution relief.",
    },
    Relief {
        name: RETIREMENT_PRS,
        base: ReliefBase::Fixed(3_000.0),
        aliases: &["prs", "private retirement scheme", "retirement planning prs"],
        keywords: &["prs", "private retirement", "retirement", "deferred annuity"],
        advice: "Contribute to a Private Retirement Scheme (PRS) or deferred \
                 annuity to claim the retirement relief.",
    },
    Relief {
        name: "Parental Care",
        base: ReliefBase::Fixed(8_000.0),
        aliases: &["parental care", "parents medical", "parental relief"],
        keywords: &["parent", "parents", "parental"],
        advice: "Claim medical, dental and care expenses paid for your parents.",
    },
    Relief {
        name: MEDICAL,
        base: ReliefBase::Fixed(8_000.0),
        aliases: &["medical", "medical relief", "medical expenses"],
        keywords: &["medical", "health", "dental", "vaccination"],
        advice: "Keep receipts for medical treatment, full check-ups and \
                 vaccinations; they qualify for medical relief.",
    },
    Relief {
        name: EDUCATION,
        base: ReliefBase::Fixed(7_000.0),
        aliases: &["education", "education relief", "education fees"],
        keywords: &["education", "course", "upskilling", "tuition"],
        advice: "Enrol in a recognised course or upskilling programme; \
                 fees for your own education are deductible.",
    },
    Relief {
        name: LIFESTYLE,
        base: ReliefBase::Fixed(2_500.0),
        aliases: &["lifestyle", "lifestyle relief", "lifestyle purchases"],
        keywords: &["lifestyle", "books", "gadgets", "internet"],
        advice: "Keep receipts for books, computers, smartphones and internet \
                 subscriptions under lifestyle relief.",
    },
    Relief {
        name: INSURANCE,
        base: ReliefBase::Fixed(3_000.0),
        aliases: &["insurance", "insurance premium", "life insurance"],
        keywords: &["insurance", "takaful"],
        advice: "Review your life insurance or takaful cover; premiums paid \
                 are deductible up to the relief limit.",
    },
    Relief {
        name: DONATION,
        base: ReliefBase::Fixed(2_000.0),
        aliases: &["donation", "donations", "charitable donation"],
        keywords: &["donation", "donations", "charity", "charitable", "zakat"],
        advice: "Give to approved charities and keep the official receipts; \
                 approved donations reduce your aggregate income.",
    },
    Relief {
        name: BUSINESS_EXPENSES,
        base: ReliefBase::IncomeShare(0.15),
        aliases: &["business expenses", "business expense"],
        keywords: &["business expense", "business expenses", "operating expenses"],
        advice: "Record every wholly and exclusively incurred business expense \
                 so it is deducted from business income.",
    },
    Relief {
        name: HOME_OFFICE,
        base: ReliefBase::Fixed(3_000.0),
        aliases: &["home office"],
        keywords: &["home office", "work from home"],
        advice: "Apportion rent, utilities and internet for the part of your \
                 home used as an office.",
    },
    Relief {
        name: LONG_TERM_INVESTMENT,
        base: ReliefBase::Fixed(3_000.0),
        aliases: &["long term investment", "long term investments"],
        keywords: &["long term"],
        advice: "Favour tax-efficient long-term investments and hold them \
                 through the qualifying period.",
    },
    Relief {
        name: CAPITAL_INVESTMENT,
        base: ReliefBase::IncomeShare(0.10),
        aliases: &["capital investment", "capital allowance", "capital allowances"],
        keywords: &["capital"],
        advice: "Time purchases of business equipment to claim capital \
                 allowances in the current year of assessment.",
    },
    Relief {
        name: BUSINESS_STRUCTURE,
        base: ReliefBase::Fixed(5_000.0),
        aliases: &["business structure", "company structure"],
        keywords: &["business structure", "incorporation", "sdn bhd"],
        advice: "Compare sole proprietorship with incorporating a Sdn Bhd; \
                 the corporate rate may be lower at your profit level.",
    },
    Relief {
        name: "Childcare",
        base: ReliefBase::Fixed(3_000.0),
        aliases: &["childcare", "child care", "childcare fees"],
        keywords: &["childcare", "child care", "kindergarten", "nursery"],
        advice: "Claim fees paid to registered childcare centres and \
                 kindergartens for children aged six and below.",
    },
    Relief {
        name: "Housing Loan Interest",
        base: ReliefBase::Fixed(7_000.0),
        aliases: &["housing loan interest", "housing loan", "home loan"],
        keywords: &["housing loan", "home loan", "mortgage"],
        advice: "Check whether interest on your first residential home loan \
                 qualifies for the housing loan relief.",
    },
];

/// Every relief in the table, in lookup order.
pub fn reliefs() -> &'static [Relief] {
    RELIEFS
}

/// Normalize a category label: lowercase ASCII alphanumerics separated by
/// single spaces.
pub fn normalize(category: &str) -> String {
    let mut out = String::with_capacity(category.len());
    let mut pending_space = false;
    for ch in category.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Resolve a category label to its relief.
///
/// Tries exact alias matches first, then keyword matches on whole words.
pub fn lookup(category: &str) -> Option<&'static Relief> {
    let key = normalize(category);
    if key.is_empty() {
        return None;
    }
    if let Some(relief) = RELIEFS
        .iter()
        .find(|r| normalize(r.name) == key || r.aliases.contains(&key.as_str()))
    {
        return Some(relief);
    }
    let padded = format!(" {key} ");
    RELIEFS
        .iter()
        .find(|r| r.keywords.iter().any(|kw| padded.contains(&format!(" {kw} "))))
}

/// Identity used to decide whether two labels name the same category.
///
/// Known reliefs compare by canonical name; anything else by its
/// normalized label.
pub fn category_key(category: &str) -> String {
    match lookup(category) {
        Some(relief) => relief.name.to_owned(),
        None => normalize(category),
    }
}

/// Saving estimate for `category` at `income`.
///
/// Known categories use `base * rate`; unknown ones the minimal
/// `income * MIN_SAVING_SHARE`. The result is always within
/// `(0, income * MAX_SAVING_SHARE]` for positive income.
pub fn estimate_saving(category: &str, income: f64) -> f64 {
    match lookup(category) {
        Some(relief) => relief.estimate(income),
        None => bounded(income * MIN_SAVING_SHARE, income),
    }
}

/// Clamp a raw estimate into the per-suggestion bound, rounded to sen.
///
/// A non-positive raw value (zero-rate bracket) becomes the minimal share.
fn bounded(raw: f64, income: f64) -> f64 {
    if !income.is_finite() || income <= 0.0 {
        return 0.0;
    }
    let cap = income * MAX_SAVING_SHARE;
    let value = if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        income * MIN_SAVING_SHARE
    };
    let rounded = (value * 100.0).round() / 100.0;
    let value = if rounded > 0.0 { rounded } else { value };
    value.min(cap)
}

/// Render the relief table as prompt reference text.
pub fn reference_text() -> String {
    let mut out = String::new();
    for relief in RELIEFS {
        let base = match relief.base {
            ReliefBase::Fixed(amount) => format!("up to RM {amount:.0}"),
            ReliefBase::IncomeShare(share) => format!("about {:.0}% of income", share * 100.0),
        };
        let _ = writeln!(out, "- {}: {base}", relief.name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_case_and_punctuation() {
        assert_eq!(normalize("  EPF-Contribution!! "), "epf contribution");
        assert_eq!(normalize("**Lifestyle  Relief**"), "lifestyle relief");
        assert_eq!(normalize("Retirement Planning (PRS)"), "retirement planning prs");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn synonyms_resolve_to_one_entry() {
        for label in ["EPF", "EPF Contribution", "KWSP", "epf contributions", "Voluntary EPF top-up"] {
            let relief = lookup(label).unwrap_or_else(|| panic!("{label:?} should resolve"));
            assert_eq!(relief.name, EPF, "label {label:?}");
        }
    }

    #[test]
    fn specific_reliefs_win_over_general_keywords() {
        assert_eq!(lookup("National Education Savings (SSPN)").map(|r| r.name), Some(SSPN));
        assert_eq!(lookup("Medical expenses for parents").map(|r| r.name), Some("Parental Care"));
        assert_eq!(lookup("Education Relief").map(|r| r.name), Some(EDUCATION));
    }

    #[test]
    fn keywords_match_whole_words_only() {
        // "prs" must not match inside another word.
        assert!(lookup("Sprsomething").is_none());
        assert_eq!(lookup("PRS top-up").map(|r| r.name), Some(RETIREMENT_PRS));
    }

    #[test]
    fn unknown_category_is_none() {
        assert!(lookup("Crypto Mining Rig").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn estimate_is_base_times_rate() {
        let lifestyle = estimate_saving("Lifestyle Relief", 60_000.0);
        assert!((lifestyle - 2_500.0 * 0.13).abs() < 1e-9);

        let epf = estimate_saving("kwsp", 60_000.0);
        assert!((epf - 4_000.0 * 0.13).abs() < 1e-9);
    }

    #[test]
    fn income_scaled_base() {
        let income = 120_000.0;
        let expected = income * 0.15 * rate_for(income);
        assert!((estimate_saving("Business Expenses", income) - expected).abs() < 1e-6);
    }

    #[test]
    fn unknown_category_uses_minimal_share() {
        let est = estimate_saving("Something Else", 60_000.0);
        assert!((est - 600.0).abs() < 1e-9);
    }

    #[test]
    fn zero_rate_bracket_still_positive() {
        let est = estimate_saving("Lifestyle Relief", 4_000.0);
        assert!(est > 0.0);
        assert!(est <= 4_000.0 * MAX_SAVING_SHARE);
        assert!((est - 40.0).abs() < 1e-9);
    }

    #[test]
    fn estimates_stay_within_bounds() {
        for relief in reliefs() {
            for income in [1.0, 999.0, 5_001.0, 60_000.0, 2_000_000.0] {
                let est = relief.estimate(income);
                assert!(est > 0.0, "{} at {income}", relief.name);
                assert!(
                    est <= income * MAX_SAVING_SHARE + 1e-9,
                    "{} at {income}: {est}",
                    relief.name
                );
            }
        }
    }

    #[test]
    fn non_positive_income_estimates_zero() {
        assert_eq!(estimate_saving("Lifestyle Relief", 0.0), 0.0);
        assert_eq!(estimate_saving("Lifestyle Relief", -5.0), 0.0);
    }

    #[test]
    fn category_key_groups_synonyms() {
        assert_eq!(category_key("KWSP"), category_key("EPF Contribution"));
        assert_eq!(category_key("Pet Care!"), "pet care");
    }

    #[test]
    fn reference_text_mentions_every_relief() {
        let text = reference_text();
        for relief in reliefs() {
            assert!(text.contains(relief.name), "missing {}", relief.name);
        }
        assert!(text.contains("Business Expenses: about 15% of income"));
    }

    #[test]
    fn canonical_names_resolve_to_themselves() {
        for relief in reliefs() {
            assert_eq!(lookup(relief.name).map(|r| r.name), Some(relief.name));
        }
    }
}
