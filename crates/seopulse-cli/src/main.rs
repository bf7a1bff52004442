mod schedule;
mod sites;
mod sync;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "seopulse")]
#[command(about = "Search Console performance sync service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sync daily performance data for tracked websites
    Sync {
        /// Restrict the run to one user's websites
        #[arg(long)]
        user: Option<Uuid>,
    },
    /// Inspect and track Search Console properties
    Sites {
        #[command(subcommand)]
        command: sites::SitesCommands,
    },
    /// Run pending database migrations
    Migrate,
    /// Run the in-process daily sync scheduler until interrupted
    Schedule,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = seopulse_core::load_app_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let cli = Cli::parse();

    let pool = seopulse_db::connect_pool(
        &config.database_url,
        seopulse_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match cli.command {
        Commands::Sync { user } => sync::run_sync(&pool, &config, user).await,
        Commands::Sites { command } => sites::run(&pool, &config, command).await,
        Commands::Migrate => {
            let applied = seopulse_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Commands::Schedule => schedule::run(pool, config).await,
    }
}
