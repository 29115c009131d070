//! Deterministic, rule-based suggestion synthesis.
//!
//! Used whenever extraction yields nothing usable. The output depends only
//! on `(income, employment type, plan type)`, so the same request always
//! produces the same list.

use taxwise_db::models::{EmploymentType, PlanType};

use crate::extract::Candidate;
use crate::request::assessment_income;
use crate::tax::reliefs::{self, lookup};

/// Categories every fallback plan includes.
const CORE: &[&str] = &[
    reliefs::LIFESTYLE,
    reliefs::MEDICAL,
    reliefs::EPF,
    reliefs::INSURANCE,
];

/// Ordered list of fallback categories for a profile.
pub fn fallback_categories(
    employment_type: EmploymentType,
    plan_type: PlanType,
) -> Vec<&'static str> {
    let mut categories = CORE.to_vec();

    match employment_type {
        EmploymentType::SelfEmployed => {
            categories.extend([reliefs::BUSINESS_EXPENSES, reliefs::HOME_OFFICE]);
        }
        EmploymentType::Employee => {
            categories.extend([reliefs::SSPN, reliefs::SOCSO]);
        }
    }

    match plan_type {
        PlanType::Future => {
            categories.extend([reliefs::LONG_TERM_INVESTMENT, reliefs::RETIREMENT_PRS]);
        }
        PlanType::Business => {
            categories.extend([reliefs::CAPITAL_INVESTMENT, reliefs::BUSINESS_STRUCTURE]);
        }
        PlanType::Standard => categories.push(reliefs::DONATION),
    }

    categories
}

/// Synthesize a full suggestion list for a profile.
///
/// Always returns at least seven candidates, each with
/// `potential_saving = base(category) * rate_for(income)` bounded to the
/// per-suggestion range. A non-positive income is assessed at the default
/// assessment income.
pub fn fallback_suggestions(
    income: f64,
    employment_type: EmploymentType,
    plan_type: PlanType,
) -> Vec<Candidate> {
    let income = assessment_income(income);
    fallback_categories(employment_type, plan_type)
        .into_iter()
        .filter_map(lookup)
        .map(|relief| Candidate::new(relief.name, relief.advice, relief.estimate(income)))
        .collect()
}
