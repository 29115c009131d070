//! Generation request and permissive income parsing.

use uuid::Uuid;

use taxwise_db::models::{EmploymentType, PlanType};

/// Income used for bounds and estimates when the requested income is not a
/// positive number.
pub const DEFAULT_ASSESSMENT_INCOME: f64 = 50_000.0;

/// Everything the pipeline needs to produce one plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    /// Owning user, passed through to the plan record.
    pub user_id: Uuid,
    /// Annual income as supplied by the caller.
    pub income: f64,
    pub employment_type: EmploymentType,
    pub plan_type: PlanType,
    /// Optional plan name; blank means "use the plan-type default".
    pub name: Option<String>,
}

impl PlanRequest {
    pub fn new(
        user_id: Uuid,
        income: f64,
        employment_type: EmploymentType,
        plan_type: PlanType,
    ) -> Self {
        Self {
            user_id,
            income,
            employment_type,
            plan_type,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The income every bound and estimate is computed against.
    ///
    /// A zero, negative or non-finite income has no meaningful 30% bound,
    /// so [`DEFAULT_ASSESSMENT_INCOME`] stands in for it.
    pub fn assessment_income(&self) -> f64 {
        assessment_income(self.income)
    }
}

/// See [`PlanRequest::assessment_income`].
pub fn assessment_income(income: f64) -> f64 {
    if income.is_finite() && income > 0.0 {
        income
    } else {
        DEFAULT_ASSESSMENT_INCOME
    }
}

/// Parse a user-supplied income string.
///
/// Accepts currency markers (`RM`, `MYR`), thousands separators and
/// surrounding whitespace. Anything unparseable, negative or non-finite
/// yields `0.0`.
pub fn parse_income(raw: &str) -> f64 {
    let mut cleaned = raw.trim().to_ascii_uppercase();
    for marker in ["MYR", "RM"] {
        cleaned = cleaned.replace(marker, "");
    }
    cleaned.retain(|c| c != ',' && !c.is_whitespace());
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => 0.0,
    }
}
