mod config;
mod generate_cmd;
mod plan_cmds;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use taxwise_core::store::PgPlanRepository;
use taxwise_db::pool;

use config::TaxwiseConfig;
use generate_cmd::{GenerateArgs, ProfileArgs};

#[derive(Parser)]
#[command(name = "taxwise", about = "Turn LLM tax advice into validated saving plans")]
struct Cli {
    /// Database URL (overrides TAXWISE_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a taxwise config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/taxwise")]
        db_url: String,
        /// Owning user ID (a new one is generated when omitted)
        #[arg(long)]
        user_id: Option<Uuid>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the taxwise database (requires config file or env vars)
    DbInit,
    /// Print the prompt that would be sent to the advisor
    Prompt {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Generate a tax saving plan
    Generate {
        #[command(flatten)]
        args: GenerateArgs,
    },
    /// Plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Suggestion tracking
    Suggestion {
        #[command(subcommand)]
        command: SuggestionCommands,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// List your plans, newest first
    List,
    /// Show a plan and its suggestions
    Show {
        /// Plan ID to show
        plan_id: String,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a plan and its suggestions
    Delete {
        /// Plan ID to delete
        plan_id: String,
    },
}

#[derive(Subcommand)]
pub enum SuggestionCommands {
    /// Mark a suggestion as implemented
    Implement {
        /// Suggestion ID
        suggestion_id: String,
        /// Clear the implemented flag instead
        #[arg(long)]
        undo: bool,
    },
}

/// Execute the `taxwise init` command: write config file.
fn cmd_init(db_url: &str, user_id: Option<Uuid>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let user_id = user_id.unwrap_or_else(Uuid::new_v4);
    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        user: config::UserSection { id: user_id },
        advisor: config::AdvisorSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  user.id = {user_id}");
    println!("  advisor.command = {}", cfg.advisor.command);
    println!();
    println!("Next: run `taxwise db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `taxwise db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = TaxwiseConfig::resolve(cli_db_url)?;

    println!("Initializing taxwise database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("taxwise db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            user_id,
            force,
        } => {
            cmd_init(&db_url, user_id, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Prompt { profile } => {
            generate_cmd::run_prompt(&profile);
        }
        Commands::Generate { args } => {
            let resolved = TaxwiseConfig::resolve(cli.database_url.as_deref())?;
            generate_cmd::run_generate(args, &resolved).await?;
        }
        Commands::Plan { command } => {
            let resolved = TaxwiseConfig::resolve(cli.database_url.as_deref())?;
            let user_id = resolved.require_user()?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let repo = PgPlanRepository::new(db_pool.clone());
            let result = plan_cmds::run_plan_command(command, &repo, user_id).await;
            db_pool.close().await;
            result?;
        }
        Commands::Suggestion { command } => {
            let resolved = TaxwiseConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let repo = PgPlanRepository::new(db_pool.clone());
            let result = plan_cmds::run_suggestion_command(command, &repo).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
