//! `taxwise plan` and `taxwise suggestion` subcommands.

use std::fmt::Write as _;

use anyhow::{Context, Result, bail};
use uuid::Uuid;

use taxwise_core::TaxPlan;
use taxwise_core::store::PlanRepository;
use taxwise_db::models::Plan;

use crate::{PlanCommands, SuggestionCommands};

/// Execute a plan subcommand against `repo` on behalf of `user_id`.
pub async fn run_plan_command(
    command: PlanCommands,
    repo: &dyn PlanRepository,
    user_id: Uuid,
) -> Result<()> {
    match command {
        PlanCommands::List => cmd_list(repo, user_id).await,
        PlanCommands::Show { plan_id, json } => cmd_show(repo, &plan_id, json).await,
        PlanCommands::Delete { plan_id } => cmd_delete(repo, &plan_id).await,
    }
}

/// Execute a suggestion subcommand against `repo`.
pub async fn run_suggestion_command(
    command: SuggestionCommands,
    repo: &dyn PlanRepository,
) -> Result<()> {
    match command {
        SuggestionCommands::Implement {
            suggestion_id,
            undo,
        } => cmd_implement(repo, &suggestion_id, !undo).await,
    }
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    raw.trim()
        .parse()
        .with_context(|| format!("invalid {what} ID: {raw}"))
}

// -----------------------------------------------------------------------
// taxwise plan list
// -----------------------------------------------------------------------

async fn cmd_list(repo: &dyn PlanRepository, user_id: Uuid) -> Result<()> {
    let plans = repo.list_for_user(user_id).await?;

    if plans.is_empty() {
        println!("No plans found. Use `taxwise generate` to create one.");
        return Ok(());
    }

    print!("{}", render_plan_list(&plans));
    Ok(())
}

/// Render plans as an aligned table, one row per plan.
pub fn render_plan_list(plans: &[Plan]) -> String {
    // ID is always 36 chars (UUID). Type max is 8 (business).
    let id_w = 36;
    let name_w = plans.iter().map(|p| p.name.len()).max().unwrap_or(4).max(4);
    let type_w = 8;
    let savings_w = 12;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<id_w$}  {:<name_w$}  {:<type_w$}  {:>savings_w$}  CREATED",
        "ID", "NAME", "TYPE", "SAVINGS (RM)",
    );
    for plan in plans {
        let created = plan.created_at.format("%Y-%m-%d %H:%M");
        let _ = writeln!(
            out,
            "{:<id_w$}  {:<name_w$}  {:<type_w$}  {:>savings_w$.2}  {}",
            plan.id,
            plan.name,
            plan.plan_type.to_string(),
            plan.potential_savings,
            created,
        );
    }
    out
}

// -----------------------------------------------------------------------
// taxwise plan show <plan-id>
// -----------------------------------------------------------------------

async fn cmd_show(repo: &dyn PlanRepository, plan_id_str: &str, json: bool) -> Result<()> {
    let plan_id = parse_id(plan_id_str, "plan")?;
    let Some(plan) = repo.get(plan_id).await? else {
        bail!("plan {plan_id} not found");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", render_plan(&plan));
    }
    Ok(())
}

/// Render a plan with its suggestions in display order.
pub fn render_plan(plan: &TaxPlan) -> String {
    let p = &plan.plan;
    let mut out = String::new();

    let _ = writeln!(out, "Plan: {}", p.name);
    let _ = writeln!(out, "  ID:           {}", p.id);
    let _ = writeln!(out, "  Type:         {}", p.plan_type);
    let _ = writeln!(out, "  Employment:   {}", p.employment_type);
    let _ = writeln!(out, "  Income:       RM {:.2}", p.income);
    let _ = writeln!(out, "  Savings:      RM {:.2}", p.potential_savings);
    let _ = writeln!(
        out,
        "  Created:      {}",
        p.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "  {}", p.description);
    let _ = writeln!(out);
    let _ = writeln!(out, "Suggestions:");
    let _ = writeln!(out);

    for s in &plan.suggestions {
        let mark = if s.is_implemented { "x" } else { " " };
        let _ = writeln!(
            out,
            "  {}. [{mark}] {}  (RM {:.2})",
            s.position + 1,
            s.category,
            s.potential_saving
        );
        let _ = writeln!(out, "     ID: {}", s.id);
        for line in s.suggestion_text.lines() {
            let _ = writeln!(out, "     {line}");
        }
        let _ = writeln!(out);
    }
    out
}

// -----------------------------------------------------------------------
// taxwise plan delete <plan-id>
// -----------------------------------------------------------------------

async fn cmd_delete(repo: &dyn PlanRepository, plan_id_str: &str) -> Result<()> {
    let plan_id = parse_id(plan_id_str, "plan")?;
    if !repo.delete(plan_id).await? {
        bail!("plan {plan_id} not found");
    }
    println!("Plan {plan_id} deleted.");
    Ok(())
}

// -----------------------------------------------------------------------
// taxwise suggestion implement <suggestion-id>
// -----------------------------------------------------------------------

async fn cmd_implement(
    repo: &dyn PlanRepository,
    suggestion_id_str: &str,
    implemented: bool,
) -> Result<()> {
    let suggestion_id = parse_id(suggestion_id_str, "suggestion")?;
    let Some(suggestion) = repo.set_implemented(suggestion_id, implemented).await? else {
        bail!("suggestion {suggestion_id} not found");
    };

    let state = if suggestion.is_implemented {
        "implemented"
    } else {
        "not implemented"
    };
    println!("Suggestion {} ({}) marked {state}.", suggestion.id, suggestion.category);
    Ok(())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
