//! The `sites` commands: property discovery and tracking (onboarding flow).

use clap::Subcommand;
use uuid::Uuid;

use seopulse_core::AppConfig;
use seopulse_db::websites;

/// Sub-commands available under `sites`.
#[derive(Debug, Subcommand)]
pub(crate) enum SitesCommands {
    /// List the properties visible in the user's Search Console account
    List {
        /// User whose Google account to query
        #[arg(long)]
        user: Uuid,
    },
    /// Track one or more properties for a user
    Track {
        /// User who owns the new tracked websites
        #[arg(long)]
        user: Uuid,

        /// Property URLs as registered in Search Console
        #[arg(required = true)]
        site_urls: Vec<String>,
    },
}

pub(crate) async fn run(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: SitesCommands,
) -> anyhow::Result<()> {
    match command {
        SitesCommands::List { user } => run_list(pool, config, user).await,
        SitesCommands::Track { user, site_urls } => run_track(pool, user, &site_urls).await,
    }
}

/// Fetches and prints the user's Search Console properties.
async fn run_list(pool: &sqlx::PgPool, config: &AppConfig, user: Uuid) -> anyhow::Result<()> {
    let (gsc, tokens) = crate::sync::build_clients(config)?;
    let token = tokens.valid_access_token(pool, user).await?;

    let sites = gsc.list_sites(&token).await?;
    if sites.is_empty() {
        println!("no properties visible for this account");
        return Ok(());
    }

    for site in sites {
        match site.permission_level {
            Some(level) => println!("{}  ({level})", site.site_url),
            None => println!("{}", site.site_url),
        }
    }
    Ok(())
}

/// Upserts tracked-website records for the given URLs.
async fn run_track(pool: &sqlx::PgPool, user: Uuid, site_urls: &[String]) -> anyhow::Result<()> {
    for site_url in site_urls {
        let site = websites::upsert_tracked_website(pool, user, site_url, None).await?;
        tracing::info!(site = %site.site_url, id = site.id, "tracking website");
        println!("tracking {}", site.site_url);
    }
    Ok(())
}
