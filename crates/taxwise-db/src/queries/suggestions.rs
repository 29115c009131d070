//! Database query functions for the `suggestions` table.

use anyhow::{Context, Result};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::Suggestion;
use crate::queries::plans;

/// Insert one suggestion row. Runs on the caller's connection so plan and
/// suggestions land in the same transaction.
pub async fn insert_suggestion(conn: &mut PgConnection, suggestion: &Suggestion) -> Result<()> {
    sqlx::query(
        "INSERT INTO suggestions (id, plan_id, position, category, suggestion_text, \
                                  potential_saving, is_implemented) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(suggestion.id)
    .bind(suggestion.plan_id)
    .bind(suggestion.position)
    .bind(&suggestion.category)
    .bind(&suggestion.suggestion_text)
    .bind(suggestion.potential_saving)
    .bind(suggestion.is_implemented)
    .execute(conn)
    .await
    .with_context(|| {
        format!(
            "failed to insert suggestion {:?} for plan {}",
            suggestion.category, suggestion.plan_id
        )
    })?;

    Ok(())
}

/// List a plan's suggestions in display order.
pub async fn list_suggestions_for_plan(pool: &PgPool, plan_id: Uuid) -> Result<Vec<Suggestion>> {
    let rows = sqlx::query_as::<_, Suggestion>(
        "SELECT * FROM suggestions WHERE plan_id = $1 ORDER BY position ASC",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await
    .context("failed to list suggestions for plan")?;

    Ok(rows)
}

/// Set the `is_implemented` flag on a suggestion and bump its plan's
/// `updated_at`.
///
/// Returns the updated suggestion, or `None` if it does not exist.
pub async fn set_implemented(
    pool: &PgPool,
    id: Uuid,
    implemented: bool,
) -> Result<Option<Suggestion>> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let row = sqlx::query_as::<_, Suggestion>(
        "UPDATE suggestions SET is_implemented = $1 WHERE id = $2 RETURNING *",
    )
    .bind(implemented)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .context("failed to update suggestion")?;

    if let Some(ref suggestion) = row {
        plans::touch_plan(&mut *tx, suggestion.plan_id).await?;
    }

    tx.commit().await.context("failed to commit transaction")?;
    Ok(row)
}
