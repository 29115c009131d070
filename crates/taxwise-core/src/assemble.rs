//! Final plan assembly.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use taxwise_db::models::{Plan, PlanType, Suggestion};

use crate::extract::Candidate;
use crate::request::PlanRequest;

/// A plan together with its ordered suggestions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxPlan {
    pub plan: Plan,
    pub suggestions: Vec<Suggestion>,
}

impl TaxPlan {
    /// Sum of the suggestion savings. Equal to `plan.potential_savings` for
    /// any assembled plan.
    pub fn suggestion_total(&self) -> f64 {
        self.suggestions.iter().map(|s| s.potential_saving).sum()
    }
}

/// Name used when the caller supplied none.
pub fn default_name(plan_type: PlanType) -> &'static str {
    match plan_type {
        PlanType::Standard => "Standard Tax Saving Plan",
        PlanType::Future => "Future Tax Planning",
        PlanType::Business => "Business Tax Strategy",
    }
}

/// Description attached to every plan of a given type.
pub fn default_description(plan_type: PlanType) -> &'static str {
    match plan_type {
        PlanType::Standard => "Reliefs and deductions to claim for the current year of assessment.",
        PlanType::Future => "Longer-term moves that keep reducing tax in the coming years.",
        PlanType::Business => "Deductions and structuring options for business income.",
    }
}

/// Build the final plan from a validated suggestion list.
///
/// Assigns fresh ids, keeps suggestion order as positions, and sets the plan
/// total to the sum of the suggestion savings. The recorded income is the
/// assessment income the savings were bounded by.
pub fn assemble(request: &PlanRequest, suggestions: Vec<Candidate>) -> TaxPlan {
    let now = Utc::now();
    let plan_id = Uuid::new_v4();

    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_name(request.plan_type))
        .to_owned();

    let suggestions: Vec<Suggestion> = suggestions
        .into_iter()
        .enumerate()
        .map(|(position, c)| Suggestion {
            id: Uuid::new_v4(),
            plan_id,
            position: i32::try_from(position).unwrap_or(i32::MAX),
            category: c.category,
            suggestion_text: c.suggestion_text,
            potential_saving: c.potential_saving,
            is_implemented: false,
        })
        .collect();

    let potential_savings = suggestions.iter().map(|s| s.potential_saving).sum();

    TaxPlan {
        plan: Plan {
            id: plan_id,
            user_id: request.user_id,
            name,
            description: default_description(request.plan_type).to_owned(),
            plan_type: request.plan_type,
            employment_type: request.employment_type,
            income: request.assessment_income(),
            potential_savings,
            created_at: now,
            updated_at: now,
        },
        suggestions,
    }
}
