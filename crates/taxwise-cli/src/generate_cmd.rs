//! `taxwise generate` and `taxwise prompt`.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use taxwise_core::advisor::{Advisor, CommandAdvisor, FileAdvisor};
use taxwise_core::prompt::build_prompt;
use taxwise_core::request::parse_income;
use taxwise_core::service::generate_and_store;
use taxwise_core::PlanRequest;
use taxwise_core::store::{InMemoryPlanRepository, PgPlanRepository, PlanRepository};
use taxwise_db::models::{EmploymentType, PlanType};
use taxwise_db::pool;

use crate::config::{AdvisorSection, TaxwiseConfig};
use crate::plan_cmds::render_plan;

/// The taxpayer profile a plan is generated for.
#[derive(Debug, Clone, Args)]
pub struct ProfileArgs {
    /// Annual income, e.g. "85000" or "RM 85,000"
    #[arg(long)]
    pub income: String,
    /// Employment type: employee or self-employed
    #[arg(long, default_value = "employee")]
    pub employment: EmploymentType,
    /// Plan type: standard, future, or business
    #[arg(long, default_value = "standard")]
    pub plan_type: PlanType,
    /// Plan name (defaults to a name derived from the plan type)
    #[arg(long)]
    pub name: Option<String>,
}

impl ProfileArgs {
    pub fn to_request(&self, user_id: Uuid) -> PlanRequest {
        let request = PlanRequest::new(
            user_id,
            parse_income(&self.income),
            self.employment,
            self.plan_type,
        );
        match &self.name {
            Some(name) => request.with_name(name.clone()),
            None => request,
        }
    }
}

/// Options specific to `taxwise generate`.
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,
    /// Read the advisor response from this file instead of running the advisor command
    #[arg(long)]
    pub response_file: Option<PathBuf>,
    /// Do not store the plan in the database
    #[arg(long)]
    pub no_save: bool,
    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute `taxwise prompt`: print the prompt that would be sent to the advisor.
pub fn run_prompt(profile: &ProfileArgs) {
    let request = profile.to_request(Uuid::nil());
    print!("{}", build_prompt(&request));
}

/// Build the advisor selected by the command line and config.
pub fn select_advisor(response_file: Option<PathBuf>, section: &AdvisorSection) -> Box<dyn Advisor> {
    match response_file {
        Some(path) => Box::new(FileAdvisor::new(path)),
        None => Box::new(CommandAdvisor::new(section.command.clone()).with_args(section.args.clone())),
    }
}

/// Execute `taxwise generate`.
///
/// With `--no-save` the plan is kept in memory only and no database
/// connection is opened; the owning user then defaults to the nil UUID.
pub async fn run_generate(args: GenerateArgs, config: &TaxwiseConfig) -> Result<()> {
    let user_id = if args.no_save {
        config.user_id.unwrap_or(Uuid::nil())
    } else {
        config.require_user()?
    };
    let request = args.profile.to_request(user_id);
    let advisor = select_advisor(args.response_file, &config.advisor);
    debug!(
        user_id = %user_id,
        advisor = advisor.name(),
        no_save = args.no_save,
        timeout_secs = config.advisor.timeout_secs,
        "generating plan"
    );

    if args.no_save {
        let repo = InMemoryPlanRepository::new();
        return generate_cancellable(advisor.as_ref(), &repo, &request, config, args.json).await;
    }

    let db_pool = pool::create_pool(&config.db_config).await?;
    let repo = PgPlanRepository::new(db_pool.clone());
    let result = generate_cancellable(advisor.as_ref(), &repo, &request, config, args.json).await;
    db_pool.close().await;
    result
}

async fn generate_cancellable(
    advisor: &dyn Advisor,
    repo: &dyn PlanRepository,
    request: &PlanRequest,
    config: &TaxwiseConfig,
    json: bool,
) -> Result<()> {
    // First signal cancels the advisor call, second force-exits.
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    let got_first_signal = Arc::new(AtomicBool::new(false));
    let got_first_clone = Arc::clone(&got_first_signal);

    let signal_task = tokio::spawn(async move {
        loop {
            tokio::signal::ctrl_c().await.ok();
            if got_first_clone.swap(true, Ordering::SeqCst) {
                eprintln!("\nForce exit.");
                std::process::exit(130);
            }
            eprintln!("\nCancelling (Ctrl+C again to force)...");
            cancel_clone.cancel();
        }
    });

    let outcome = tokio::select! {
        result = generate_and_store(advisor, repo, request, config.advisor.timeout()) => Some(result),
        _ = cancel.cancelled() => None,
    };
    signal_task.abort();

    let Some(result) = outcome else {
        bail!("plan generation cancelled");
    };
    let plan = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", render_plan(&plan));
    }
    Ok(())
}
