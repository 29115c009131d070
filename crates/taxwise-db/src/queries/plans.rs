//! Database query functions for the `plans` table.

use anyhow::{Context, Result};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::Plan;

/// Insert a fully assembled plan row.
///
/// Ids and timestamps are assigned by the caller at assembly time, so the
/// row is inserted verbatim. Takes a connection so it can run inside the
/// caller's transaction.
pub async fn insert_plan(conn: &mut PgConnection, plan: &Plan) -> Result<Plan> {
    let row = sqlx::query_as::<_, Plan>(
        "INSERT INTO plans (id, user_id, name, description, plan_type, employment_type, \
                            income, potential_savings, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING *",
    )
    .bind(plan.id)
    .bind(plan.user_id)
    .bind(&plan.name)
    .bind(&plan.description)
    .bind(plan.plan_type)
    .bind(plan.employment_type)
    .bind(plan.income)
    .bind(plan.potential_savings)
    .bind(plan.created_at)
    .bind(plan.updated_at)
    .fetch_one(conn)
    .await
    .with_context(|| format!("failed to insert plan {}", plan.id))?;

    Ok(row)
}

/// Fetch a plan by its ID.
pub async fn get_plan(pool: &PgPool, id: Uuid) -> Result<Option<Plan>> {
    let plan = sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch plan")?;

    Ok(plan)
}

/// List a user's plans, newest first.
pub async fn list_plans_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Plan>> {
    let plans = sqlx::query_as::<_, Plan>(
        "SELECT * FROM plans WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to list plans")?;

    Ok(plans)
}

/// Delete a plan and (via cascade) its suggestions.
///
/// Returns `false` when no plan with that ID existed.
pub async fn delete_plan(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM plans WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete plan")?;

    Ok(result.rows_affected() > 0)
}

/// Bump a plan's `updated_at` to now.
pub async fn touch_plan(conn: &mut PgConnection, id: Uuid) -> Result<()> {
    sqlx::query("UPDATE plans SET updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await
        .context("failed to touch plan")?;

    Ok(())
}
