//! Background job scheduler.
//!
//! Registers the recurring all-users sync job and runs it in-process until
//! the process is interrupted. The [`JobScheduler`] handle must be kept
//! alive for the lifetime of the process — dropping it shuts down all jobs.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use seopulse_core::AppConfig;
use seopulse_sync::{sync_all, SyncOptions};

pub(crate) async fn run(pool: PgPool, config: AppConfig) -> anyhow::Result<()> {
    let scheduler = JobScheduler::new().await?;
    register_daily_sync_job(&scheduler, pool, Arc::new(config)).await?;
    scheduler.start().await?;

    tracing::info!("scheduler running; press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("scheduler shutting down");
    Ok(())
}

/// Register the daily all-users sync job.
///
/// Runs every day at 01:00 UTC (`0 0 1 * * *`), mirroring the cadence the
/// Search Console API refreshes daily aggregates on.
async fn register_daily_sync_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 0 1 * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);

        Box::pin(async move {
            tracing::info!("scheduler: starting daily Search Console sync");
            run_daily_sync(&pool, &config).await;
            tracing::info!("scheduler: daily Search Console sync complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Drive one all-users sync run, logging instead of propagating failures so
/// the scheduler stays alive for the next tick.
async fn run_daily_sync(pool: &PgPool, config: &AppConfig) {
    let (gsc, tokens) = match crate::sync::build_clients(config) {
        Ok(clients) => clients,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to build API clients");
            return;
        }
    };

    let options = SyncOptions::from_app_config(config, None);
    match sync_all(pool, &gsc, &tokens, &options).await {
        Ok(stats) => {
            tracing::info!(
                total = stats.total,
                success = stats.success,
                error = stats.error,
                skipped = stats.skipped,
                "scheduler: sync finished"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduler: sync failed");
        }
    }
}
