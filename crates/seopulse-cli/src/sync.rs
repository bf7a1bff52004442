//! The `sync` command: one orchestrator run, global or user-scoped.

use uuid::Uuid;

use seopulse_core::AppConfig;
use seopulse_gsc::{GscClient, OauthClient};
use seopulse_sync::{sync_all, SyncOptions, TokenManager};

/// Builds the Search Console client and token manager from config.
///
/// Called per run rather than held globally; both are cheap to construct and
/// this keeps credentials flowing through the config struct instead of
/// ambient state.
pub(crate) fn build_clients(config: &AppConfig) -> anyhow::Result<(GscClient, TokenManager)> {
    let gsc = GscClient::new(config.gsc_request_timeout_secs)?;
    let oauth = OauthClient::new(config.gsc_request_timeout_secs)?;
    let tokens = TokenManager::new(oauth, config.oauth_credentials.clone());
    Ok((gsc, tokens))
}

/// Runs the sync once and reports the aggregate outcome.
///
/// # Errors
///
/// Returns an error if the clients cannot be constructed, the website
/// listing fails, or every website fails. Per-website failures otherwise
/// only show up in the printed stats.
pub(crate) async fn run_sync(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    user: Option<Uuid>,
) -> anyhow::Result<()> {
    let (gsc, tokens) = build_clients(config)?;
    let options = SyncOptions::from_app_config(config, user);

    let stats = sync_all(pool, &gsc, &tokens, &options).await?;

    println!(
        "synced {} website(s): {} succeeded, {} failed, {} skipped",
        stats.total, stats.success, stats.error, stats.skipped
    );

    if stats.total > 0 && stats.error == stats.total {
        anyhow::bail!("all {} websites failed to sync", stats.total);
    }

    Ok(())
}
