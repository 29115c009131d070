use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Employment profile of the person a plan is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    Employee,
    SelfEmployed,
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Employee => "employee",
            Self::SelfEmployed => "self-employed",
        };
        f.write_str(s)
    }
}

impl FromStr for EmploymentType {
    type Err = EmploymentTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(Self::Employee),
            "self-employed" | "self_employed" | "selfemployed" => Ok(Self::SelfEmployed),
            _ => Err(EmploymentTypeParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`EmploymentType`] string.
#[derive(Debug, Clone)]
pub struct EmploymentTypeParseError(pub String);

impl fmt::Display for EmploymentTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid employment type: {:?} (expected employee or self-employed)",
            self.0
        )
    }
}

impl std::error::Error for EmploymentTypeParseError {}

// ---------------------------------------------------------------------------

/// Kind of plan requested; drives default naming and fallback categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    Standard,
    Future,
    Business,
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Standard => "standard",
            Self::Future => "future",
            Self::Business => "business",
        };
        f.write_str(s)
    }
}

impl FromStr for PlanType {
    type Err = PlanTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "future" => Ok(Self::Future),
            "business" => Ok(Self::Business),
            _ => Err(PlanTypeParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`PlanType`] string.
#[derive(Debug, Clone)]
pub struct PlanTypeParseError(pub String);

impl fmt::Display for PlanTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid plan type: {:?} (expected standard, future, or business)",
            self.0
        )
    }
}

impl std::error::Error for PlanTypeParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A generated tax-saving plan.
///
/// `potential_savings` always equals the sum of the plan's suggestion
/// savings; the value is computed once at assembly and stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Plan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub plan_type: PlanType,
    pub employment_type: EmploymentType,
    /// Assessment income the plan was computed against.
    pub income: f64,
    pub potential_savings: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One actionable recommendation within a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Suggestion {
    pub id: Uuid,
    pub plan_id: Uuid,
    /// Zero-based display order within the plan.
    pub position: i32,
    pub category: String,
    pub suggestion_text: String,
    pub potential_saving: f64,
    pub is_implemented: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
