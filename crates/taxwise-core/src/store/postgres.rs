//! PostgreSQL-backed [`PlanRepository`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use taxwise_db::models::{Plan, Suggestion};
use taxwise_db::queries::{plans, suggestions};

use super::PlanRepository;
use crate::assemble::TaxPlan;

#[derive(Debug, Clone)]
pub struct PgPlanRepository {
    pool: PgPool,
}

impl PgPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PlanRepository for PgPlanRepository {
    async fn save(&self, plan: &TaxPlan) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        plans::insert_plan(&mut *tx, &plan.plan).await?;
        for suggestion in &plan.suggestions {
            suggestions::insert_suggestion(&mut *tx, suggestion).await?;
        }

        tx.commit().await.context("failed to commit plan")?;
        debug!(
            plan_id = %plan.plan.id,
            suggestions = plan.suggestions.len(),
            "plan saved"
        );
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<TaxPlan>> {
        let Some(plan) = plans::get_plan(&self.pool, id).await? else {
            return Ok(None);
        };
        let suggestions = suggestions::list_suggestions_for_plan(&self.pool, id).await?;
        Ok(Some(TaxPlan { plan, suggestions }))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Plan>> {
        plans::list_plans_for_user(&self.pool, user_id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        plans::delete_plan(&self.pool, id).await
    }

    async fn set_implemented(
        &self,
        suggestion_id: Uuid,
        implemented: bool,
    ) -> Result<Option<Suggestion>> {
        suggestions::set_implemented(&self.pool, suggestion_id, implemented).await
    }
}
