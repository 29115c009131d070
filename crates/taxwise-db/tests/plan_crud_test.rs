//! Integration tests for plan and suggestion queries.
//!
//! Each test gets its own freshly migrated database from
//! `taxwise-test-utils` and drops it on completion.

use chrono::{Duration as ChronoDuration, Utc};
use uuid::Uuid;

use taxwise_db::models::{EmploymentType, Plan, PlanType, Suggestion};
use taxwise_db::pool;
use taxwise_db::queries::{plans, suggestions};
use taxwise_test_utils::{create_test_db, drop_test_db};

fn sample_plan(user_id: Uuid) -> Plan {
    let now = Utc::now();
    Plan {
        id: Uuid::new_v4(),
        user_id,
        name: "Standard Tax Saving Plan".to_string(),
        description: "Reliefs for this year.".to_string(),
        plan_type: PlanType::Standard,
        employment_type: EmploymentType::SelfEmployed,
        income: 60_000.0,
        potential_savings: 1_560.0,
        created_at: now,
        updated_at: now,
    }
}

fn sample_suggestion(plan_id: Uuid, position: i32, category: &str, saving: f64) -> Suggestion {
    Suggestion {
        id: Uuid::new_v4(),
        plan_id,
        position,
        category: category.to_string(),
        suggestion_text: format!("Claim {category}."),
        potential_saving: saving,
        is_implemented: false,
    }
}

async fn insert_with_suggestions(pool: &sqlx::PgPool, plan: &Plan, items: &[Suggestion]) {
    let mut conn = pool.acquire().await.expect("acquire connection");
    plans::insert_plan(&mut conn, plan)
        .await
        .expect("insert_plan should succeed");
    for s in items {
        suggestions::insert_suggestion(&mut conn, s)
            .await
            .expect("insert_suggestion should succeed");
    }
}

// -----------------------------------------------------------------------
// Plans
// -----------------------------------------------------------------------

#[tokio::test]
async fn insert_and_get_plan() {
    let (pool, db_name) = create_test_db().await;

    let plan = sample_plan(Uuid::new_v4());
    let mut conn = pool.acquire().await.unwrap();
    let inserted = plans::insert_plan(&mut conn, &plan).await.unwrap();
    drop(conn);

    assert_eq!(inserted.id, plan.id);
    assert_eq!(inserted.employment_type, EmploymentType::SelfEmployed);

    let fetched = plans::get_plan(&pool, plan.id)
        .await
        .expect("get_plan should succeed")
        .expect("plan should exist");
    assert_eq!(fetched.name, plan.name);
    assert_eq!(fetched.plan_type, PlanType::Standard);
    assert_eq!(fetched.potential_savings, 1_560.0);

    assert!(plans::get_plan(&pool, Uuid::new_v4()).await.unwrap().is_none());

    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn list_plans_newest_first_per_user() {
    let (pool, db_name) = create_test_db().await;

    let user = Uuid::new_v4();
    let mut older = sample_plan(user);
    older.created_at = Utc::now() - ChronoDuration::days(2);
    older.updated_at = older.created_at;
    let newer = sample_plan(user);
    let other = sample_plan(Uuid::new_v4());

    for p in [&older, &newer, &other] {
        insert_with_suggestions(&pool, p, &[]).await;
    }

    let listed = plans::list_plans_for_user(&pool, user).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn delete_plan_cascades_to_suggestions() {
    let (pool, db_name) = create_test_db().await;

    let plan = sample_plan(Uuid::new_v4());
    let items = vec![
        sample_suggestion(plan.id, 0, "EPF Contribution", 520.0),
        sample_suggestion(plan.id, 1, "Medical Relief", 1_040.0),
    ];
    insert_with_suggestions(&pool, &plan, &items).await;

    assert!(plans::delete_plan(&pool, plan.id).await.unwrap());
    assert!(!plans::delete_plan(&pool, plan.id).await.unwrap());
    assert!(
        suggestions::list_suggestions_for_plan(&pool, plan.id)
            .await
            .unwrap()
            .is_empty()
    );

    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn non_positive_total_is_rejected() {
    let (pool, db_name) = create_test_db().await;

    let mut plan = sample_plan(Uuid::new_v4());
    plan.potential_savings = 0.0;
    let mut conn = pool.acquire().await.unwrap();
    assert!(plans::insert_plan(&mut conn, &plan).await.is_err());

    drop_test_db(&db_name).await;
}

// -----------------------------------------------------------------------
// Suggestions
// -----------------------------------------------------------------------

#[tokio::test]
async fn suggestions_listed_in_position_order() {
    let (pool, db_name) = create_test_db().await;

    let plan = sample_plan(Uuid::new_v4());
    let items = vec![
        sample_suggestion(plan.id, 2, "Donation", 260.0),
        sample_suggestion(plan.id, 0, "EPF Contribution", 520.0),
        sample_suggestion(plan.id, 1, "Medical Relief", 1_040.0),
    ];
    insert_with_suggestions(&pool, &plan, &items).await;

    let listed = suggestions::list_suggestions_for_plan(&pool, plan.id)
        .await
        .unwrap();
    let cats: Vec<&str> = listed.iter().map(|s| s.category.as_str()).collect();
    assert_eq!(cats, vec!["EPF Contribution", "Medical Relief", "Donation"]);

    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn duplicate_position_is_rejected() {
    let (pool, db_name) = create_test_db().await;

    let plan = sample_plan(Uuid::new_v4());
    insert_with_suggestions(
        &pool,
        &plan,
        &[sample_suggestion(plan.id, 0, "EPF Contribution", 520.0)],
    )
    .await;

    let mut conn = pool.acquire().await.unwrap();
    let dup = sample_suggestion(plan.id, 0, "Donation", 260.0);
    assert!(suggestions::insert_suggestion(&mut conn, &dup).await.is_err());

    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn set_implemented_bumps_plan_updated_at() {
    let (pool, db_name) = create_test_db().await;

    let mut plan = sample_plan(Uuid::new_v4());
    plan.updated_at = Utc::now() - ChronoDuration::hours(1);
    let item = sample_suggestion(plan.id, 0, "EPF Contribution", 520.0);
    insert_with_suggestions(&pool, &plan, std::slice::from_ref(&item)).await;

    let updated = suggestions::set_implemented(&pool, item.id, true)
        .await
        .unwrap()
        .expect("suggestion should exist");
    assert!(updated.is_implemented);

    let fetched = plans::get_plan(&pool, plan.id).await.unwrap().unwrap();
    assert!(fetched.updated_at > plan.updated_at);

    let undone = suggestions::set_implemented(&pool, item.id, false)
        .await
        .unwrap()
        .unwrap();
    assert!(!undone.is_implemented);

    assert!(
        suggestions::set_implemented(&pool, Uuid::new_v4(), true)
            .await
            .unwrap()
            .is_none()
    );

    drop_test_db(&db_name).await;
}

// -----------------------------------------------------------------------
// Pool helpers
// -----------------------------------------------------------------------

#[tokio::test]
async fn table_counts_cover_every_table() {
    let (pool, db_name) = create_test_db().await;

    let plan = sample_plan(Uuid::new_v4());
    insert_with_suggestions(
        &pool,
        &plan,
        &[sample_suggestion(plan.id, 0, "EPF Contribution", 520.0)],
    )
    .await;

    let counts = pool::table_counts(&pool).await.unwrap();
    assert_eq!(
        counts,
        vec![("plans".to_string(), 1), ("suggestions".to_string(), 1)]
    );

    // Re-running migrations is a no-op.
    pool::run_migrations(&pool).await.unwrap();

    drop_test_db(&db_name).await;
}
