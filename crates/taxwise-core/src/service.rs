//! Generate-then-persist orchestration used by the CLI.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::advisor::{Advisor, AdvisorError};
use crate::assemble::TaxPlan;
use crate::pipeline::{PlanError, generate_plan};
use crate::request::PlanRequest;
use crate::store::PlanRepository;

/// Run the pipeline with a deadline on the advisor call.
///
/// Expiry is reported as [`PlanError::ServiceUnavailable`]. `None` waits
/// indefinitely.
pub async fn generate_with_timeout(
    advisor: &dyn Advisor,
    request: &PlanRequest,
    timeout: Option<Duration>,
) -> Result<TaxPlan, PlanError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, generate_plan(advisor, request))
            .await
            .unwrap_or_else(|_| Err(PlanError::ServiceUnavailable(AdvisorError::TimedOut(limit)))),
        None => generate_plan(advisor, request).await,
    }
}

/// Generate a plan and hand it to `repo`.
///
/// Nothing is saved when the advisor call fails.
pub async fn generate_and_store(
    advisor: &dyn Advisor,
    repo: &dyn PlanRepository,
    request: &PlanRequest,
    timeout: Option<Duration>,
) -> Result<TaxPlan> {
    let plan = generate_with_timeout(advisor, request, timeout).await?;
    repo.save(&plan)
        .await
        .with_context(|| format!("failed to save plan {}", plan.plan.id))?;
    info!(plan_id = %plan.plan.id, user_id = %plan.plan.user_id, "plan stored");
    Ok(plan)
}
