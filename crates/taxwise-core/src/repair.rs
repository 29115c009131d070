//! Validation and repair of extracted candidates.
//!
//! Turns whatever the extractor found into a suggestion list that satisfies
//! the plan invariants:
//!
//! - every saving is within `(0, income * MAX_SAVING_SHARE]`,
//! - there are at least [`MIN_SUGGESTIONS`] suggestions,
//! - the total is positive.
//!
//! Out-of-bound amounts are replaced by the relief estimate rather than
//! dropped. When nothing usable was extracted the whole list comes from
//! [`fallback_suggestions`].

use std::collections::HashSet;

use crate::extract::{Candidate, Extraction};
use crate::fallback::fallback_suggestions;
use crate::request::PlanRequest;
use crate::tax::MAX_SAVING_SHARE;
use crate::tax::reliefs::{self, category_key, estimate_saving};

/// Minimum number of suggestions in a completed plan.
pub const MIN_SUGGESTIONS: usize = 5;

/// Categories used to top up a short list, in order.
pub const TOP_UP_PRIORITY: &[&str] = &[
    reliefs::EDUCATION,
    reliefs::MEDICAL,
    reliefs::SSPN,
    reliefs::DONATION,
    reliefs::INSURANCE,
    reliefs::LIFESTYLE,
    reliefs::EPF,
];

/// Where the final suggestion list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Extracted candidates, possibly repaired or topped up.
    Extracted,
    /// Deterministic fallback synthesis.
    Fallback,
}

/// Output of [`repair`].
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired {
    pub suggestions: Vec<Candidate>,
    pub source: Source,
    /// Candidates whose amount was replaced by an estimate.
    pub repaired: usize,
    /// Suggestions appended by the breadth top-up.
    pub topped_up: usize,
}

impl Repaired {
    pub fn total(&self) -> f64 {
        self.suggestions.iter().map(|s| s.potential_saving).sum()
    }
}

/// Validate, repair and top up an extraction result.
pub fn repair(extraction: &Extraction, request: &PlanRequest) -> Repaired {
    let income = request.assessment_income();

    if extraction.candidates.is_empty() {
        tracing::warn!("no usable candidates in response, using fallback suggestions");
        return fallback(request);
    }

    let cap = income * MAX_SAVING_SHARE;
    let mut repaired = 0;
    let mut suggestions: Vec<Candidate> = extraction
        .candidates
        .iter()
        .map(|candidate| {
            if within_bound(candidate.potential_saving, cap) {
                return candidate.clone();
            }
            let estimate = estimate_saving(&candidate.category, income);
            tracing::debug!(
                category = %candidate.category,
                amount = candidate.potential_saving,
                bound = cap,
                estimate,
                "saving out of bounds, replaced by estimate"
            );
            repaired += 1;
            Candidate {
                potential_saving: estimate,
                ..candidate.clone()
            }
        })
        .collect();

    let working_total: f64 = suggestions.iter().map(|s| s.potential_saving).sum();
    if working_total.is_nan() || working_total <= 0.0 {
        tracing::warn!(working_total, "extracted savings sum to nothing, using fallback suggestions");
        return fallback(request);
    }

    let topped_up = top_up(&mut suggestions, income);
    if topped_up > 0 {
        tracing::debug!(added = topped_up, "topped up suggestion list");
    }

    let result = Repaired {
        suggestions,
        source: Source::Extracted,
        repaired,
        topped_up,
    };

    if let Some(reported) = extraction.reported_total {
        let total = result.total();
        if (reported - total).abs() > 0.01 {
            tracing::info!(reported, total, "ignoring reported total that disagrees with items");
        }
    }

    result
}

fn fallback(request: &PlanRequest) -> Repaired {
    Repaired {
        suggestions: fallback_suggestions(
            request.income,
            request.employment_type,
            request.plan_type,
        ),
        source: Source::Fallback,
        repaired: 0,
        topped_up: 0,
    }
}

fn within_bound(amount: f64, cap: f64) -> bool {
    amount.is_finite() && amount > 0.0 && amount <= cap
}

/// Append priority categories not yet present until the list reaches
/// [`MIN_SUGGESTIONS`]. Returns the number appended.
fn top_up(suggestions: &mut Vec<Candidate>, income: f64) -> usize {
    let mut present: HashSet<String> = suggestions
        .iter()
        .map(|s| category_key(&s.category))
        .collect();
    let mut added = 0;

    for category in TOP_UP_PRIORITY {
        if suggestions.len() >= MIN_SUGGESTIONS {
            break;
        }
        if !present.insert(category_key(category)) {
            continue;
        }
        let Some(relief) = reliefs::lookup(category) else {
            continue;
        };
        suggestions.push(Candidate::new(
            relief.name,
            relief.advice,
            relief.estimate(income),
        ));
        added += 1;
    }
    added
}

#[cfg(test)]
mod tests {
    use taxwise_db::models::{EmploymentType, PlanType};
    use uuid::Uuid;

    use super::*;
    use crate::extract::Strategy;

    fn request(income: f64) -> PlanRequest {
        PlanRequest::new(Uuid::nil(), income, EmploymentType::Employee, PlanType::Standard)
    }

    fn extraction(candidates: Vec<Candidate>) -> Extraction {
        Extraction {
            candidates,
            reported_total: None,
            strategy: Some(Strategy::Delimited),
        }
    }

    fn categories(r: &Repaired) -> Vec<&str> {
        r.suggestions.iter().map(|s| s.category.as_str()).collect()
    }

    #[test]
    fn empty_extraction_uses_fallback() {
        let r = repair(&Extraction::default(), &request(60_000.0));
        assert_eq!(r.source, Source::Fallback);
        assert!(r.suggestions.len() >= MIN_SUGGESTIONS);
    }

    #[test]
    fn valid_candidate_kept_and_topped_up() {
        let r = repair(
            &extraction(vec![Candidate::new("Lifestyle Relief", "Books.", 325.0)]),
            &request(60_000.0),
        );
        assert_eq!(r.source, Source::Extracted);
        assert_eq!(r.repaired, 0);
        assert_eq!(r.topped_up, 4);
        assert_eq!(
            categories(&r),
            vec![
                "Lifestyle Relief",
                "Education Relief",
                "Medical Relief",
                "SSPN Savings",
                "Donation",
            ]
        );
        assert_eq!(r.suggestions[0].potential_saving, 325.0);
    }

    #[test]
    fn excessive_amount_is_repaired_not_dropped() {
        let r = repair(
            &extraction(vec![Candidate::new("Lifestyle Relief", "Books.", 50_000.0)]),
            &request(60_000.0),
        );
        assert_eq!(r.repaired, 1);
        assert_eq!(r.suggestions[0].category, "Lifestyle Relief");
        assert_eq!(r.suggestions[0].suggestion_text, "Books.");
        assert!((r.suggestions[0].potential_saving - 2_500.0 * 0.13).abs() < 1e-9);
    }

    #[test]
    fn non_positive_and_non_finite_amounts_are_repaired() {
        let r = repair(
            &extraction(vec![
                Candidate::new("EPF", "Top up.", -10.0),
                Candidate::new("Medical Relief", "Check-up.", 0.0),
                Candidate::new("Mystery", "Something.", f64::NAN),
            ]),
            &request(60_000.0),
        );
        assert_eq!(r.repaired, 3);
        assert!((r.suggestions[0].potential_saving - 520.0).abs() < 1e-9);
        assert!((r.suggestions[2].potential_saving - 600.0).abs() < 1e-9);
        assert!(r.suggestions.iter().all(|s| s.potential_saving > 0.0));
    }

    #[test]
    fn top_up_skips_present_categories_by_identity() {
        let r = repair(
            &extraction(vec![
                Candidate::new("Education fees", "Course.", 100.0),
                Candidate::new("Health screening", "Check-up.", 100.0),
            ]),
            &request(60_000.0),
        );
        assert_eq!(
            categories(&r)[2..],
            ["SSPN Savings", "Donation", "Insurance Premium"]
        );
    }

    #[test]
    fn unknown_categories_still_reach_breadth() {
        let r = repair(
            &extraction(vec![
                Candidate::new("Pet care", "Vet bills.", 50.0),
                Candidate::new("Gardening", "Plants.", 50.0),
            ]),
            &request(30_000.0),
        );
        assert_eq!(r.suggestions.len(), MIN_SUGGESTIONS);
    }

    #[test]
    fn long_lists_are_not_topped_up() {
        let list: Vec<_> = (0..6)
            .map(|i| Candidate::new(format!("Custom {i}"), "Do it.", 100.0))
            .collect();
        let r = repair(&extraction(list.clone()), &request(60_000.0));
        assert_eq!(r.suggestions, list);
        assert_eq!(r.topped_up, 0);
    }

    #[test]
    fn reported_total_is_ignored() {
        let mut ex = extraction(vec![Candidate::new("Lifestyle Relief", "Books.", 325.0)]);
        ex.reported_total = Some(999_999.0);
        let r = repair(&ex, &request(60_000.0));
        assert!(r.total() < 999_999.0);
        let sum: f64 = r.suggestions.iter().map(|s| s.potential_saving).sum();
        assert!((r.total() - sum).abs() < 1e-9);
    }

    #[test]
    fn zero_income_is_assessed_at_default() {
        let r = repair(
            &extraction(vec![Candidate::new("Lifestyle Relief", "Books.", 20_000.0)]),
            &request(0.0),
        );
        // 30% of the default assessment income is 15,000.
        assert_eq!(r.repaired, 1);
        assert!(r.suggestions.iter().all(|s| s.potential_saving <= 15_000.0));
    }

    #[test]
    fn repair_is_idempotent() {
        let first = repair(
            &extraction(vec![
                Candidate::new("Lifestyle Relief", "Books.", 50_000.0),
                Candidate::new("EPF", "Top up.", 520.0),
            ]),
            &request(60_000.0),
        );
        let second = repair(&extraction(first.suggestions.clone()), &request(60_000.0));
        assert_eq!(second.suggestions, first.suggestions);
        assert_eq!(second.repaired, 0);
        assert_eq!(second.topped_up, 0);

        let fallback = repair(&Extraction::default(), &request(60_000.0));
        let again = repair(&extraction(fallback.suggestions.clone()), &request(60_000.0));
        assert_eq!(again.suggestions, fallback.suggestions);
    }
}
