//! In-memory [`PlanRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use taxwise_db::models::{Plan, Suggestion};

use super::PlanRepository;
use crate::assemble::TaxPlan;

/// Plans held in a process-local map. Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlanRepository {
    plans: Arc<Mutex<HashMap<Uuid, TaxPlan>>>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored plans.
    pub async fn len(&self) -> usize {
        self.plans.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.plans.lock().await.is_empty()
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn save(&self, plan: &TaxPlan) -> Result<()> {
        let mut plans = self.plans.lock().await;
        if plans.contains_key(&plan.plan.id) {
            bail!("plan {} already exists", plan.plan.id);
        }
        plans.insert(plan.plan.id, plan.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<TaxPlan>> {
        Ok(self.plans.lock().await.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Plan>> {
        let plans = self.plans.lock().await;
        let mut out: Vec<Plan> = plans
            .values()
            .filter(|p| p.plan.user_id == user_id)
            .map(|p| p.plan.clone())
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.plans.lock().await.remove(&id).is_some())
    }

    async fn set_implemented(
        &self,
        suggestion_id: Uuid,
        implemented: bool,
    ) -> Result<Option<Suggestion>> {
        let mut plans = self.plans.lock().await;
        for stored in plans.values_mut() {
            if let Some(suggestion) = stored
                .suggestions
                .iter_mut()
                .find(|s| s.id == suggestion_id)
            {
                suggestion.is_implemented = implemented;
                stored.plan.updated_at = Utc::now();
                return Ok(Some(suggestion.clone()));
            }
        }
        Ok(None)
    }
}
