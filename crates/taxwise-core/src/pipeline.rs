//! The plan-synthesis pipeline.
//!
//! ```text
//! Start -> Extracting -> Validating -> (RepairingOrFallback)* -> Assembled
//! ```
//!
//! [`synthesize_plan`] covers everything after the advisor call and cannot
//! fail. [`generate_plan`] adds the single awaited advisor call in front of
//! it; an advisor failure is the only error that leaves the pipeline.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::advisor::{Advisor, AdvisorError};
use crate::assemble::{TaxPlan, assemble};
use crate::extract::{self, Extraction};
use crate::prompt::build_prompt;
use crate::repair::{Source, repair};
use crate::request::PlanRequest;

/// Errors surfaced by [`generate_plan`].
#[derive(Debug, Error)]
pub enum PlanError {
    /// The advisor could not produce a response.
    #[error("tax advice service unavailable: {0}")]
    ServiceUnavailable(#[from] AdvisorError),
}

/// Pipeline stages, reported as debug events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Extracting,
    Validating,
    RepairingOrFallback,
    Assembled,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::Extracting => "extracting",
            Self::Validating => "validating",
            Self::RepairingOrFallback => "repairing_or_fallback",
            Self::Assembled => "assembled",
        };
        f.write_str(s)
    }
}

fn enter(stage: Stage) {
    debug!(stage = %stage, "plan pipeline stage");
}

/// Turn advisor text (or its absence) into an assembled plan.
///
/// Never fails: anything unusable in `text` is resolved by repair or
/// fallback synthesis.
pub fn synthesize_plan(text: Option<&str>, request: &PlanRequest) -> TaxPlan {
    enter(Stage::Start);

    enter(Stage::Extracting);
    let extraction = match text {
        Some(text) => extract::extract(text),
        None => Extraction::default(),
    };

    enter(Stage::Validating);
    let repaired = repair(&extraction, request);
    if repaired.source == Source::Fallback || repaired.repaired > 0 || repaired.topped_up > 0 {
        enter(Stage::RepairingOrFallback);
    }

    let plan = assemble(request, repaired.suggestions);
    enter(Stage::Assembled);

    info!(
        plan_id = %plan.plan.id,
        suggestions = plan.suggestions.len(),
        potential_savings = plan.plan.potential_savings,
        strategy = extraction.strategy.map(|s| s.to_string()).unwrap_or_else(|| "none".to_string()),
        fallback = repaired.source == Source::Fallback,
        repaired = repaired.repaired,
        topped_up = repaired.topped_up,
        "plan assembled"
    );
    plan
}

/// Ask `advisor` for advice on `request` and assemble the resulting plan.
///
/// The advisor is awaited exactly once. Dropping the returned future before
/// it completes aborts the call and assembles nothing.
pub async fn generate_plan(
    advisor: &dyn Advisor,
    request: &PlanRequest,
) -> Result<TaxPlan, PlanError> {
    let prompt = build_prompt(request);
    debug!(advisor = advisor.name(), prompt_bytes = prompt.len(), "requesting advice");

    let text = advisor.complete(&prompt).await?;
    Ok(synthesize_plan(Some(&text), request))
}

#[cfg(test)]
mod tests {
    use taxwise_db::models::{EmploymentType, PlanType};
    use uuid::Uuid;

    use super::*;

    fn request() -> PlanRequest {
        PlanRequest::new(Uuid::nil(), 60_000.0, EmploymentType::Employee, PlanType::Standard)
    }

    #[test]
    fn absent_and_empty_text_both_fall_back() {
        let a = synthesize_plan(None, &request());
        let b = synthesize_plan(Some(""), &request());
        let cats = |p: &TaxPlan| -> Vec<String> {
            p.suggestions.iter().map(|s| s.category.clone()).collect()
        };
        assert_eq!(cats(&a), cats(&b));
        assert!(a.suggestions.len() >= 5);
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::RepairingOrFallback.to_string(), "repairing_or_fallback");
        assert_eq!(Stage::Assembled.to_string(), "assembled");
    }

    #[test]
    fn service_unavailable_wraps_advisor_error() {
        let err: PlanError = AdvisorError::EmptyResponse.into();
        assert_eq!(
            err.to_string(),
            "tax advice service unavailable: advisor returned an empty response"
        );
    }
}
