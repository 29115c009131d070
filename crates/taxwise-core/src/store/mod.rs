//! Plan persistence interface.
//!
//! The pipeline never touches storage. Callers hand an assembled
//! [`TaxPlan`](crate::TaxPlan) to a [`PlanRepository`]:
//!
//! - [`PgPlanRepository`]: PostgreSQL through `taxwise-db`.
//! - [`InMemoryPlanRepository`]: process-local, for tests and dry runs.

pub mod memory;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use taxwise_db::models::{Plan, Suggestion};

use crate::assemble::TaxPlan;

pub use memory::InMemoryPlanRepository;
pub use postgres::PgPlanRepository;

/// CRUD over plans keyed by plan id and owning user.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Store a newly assembled plan with all of its suggestions.
    async fn save(&self, plan: &TaxPlan) -> Result<()>;

    /// Load a plan and its suggestions in position order.
    async fn get(&self, id: Uuid) -> Result<Option<TaxPlan>>;

    /// A user's plans, newest first, without suggestions.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Plan>>;

    /// Remove a plan and its suggestions. Returns `false` if it did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Mark a suggestion as implemented (or not).
    async fn set_implemented(
        &self,
        suggestion_id: Uuid,
        implemented: bool,
    ) -> Result<Option<Suggestion>>;
}

// Compile-time assertion: PlanRepository must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanRepository) {}
};
