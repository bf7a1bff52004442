//! The sync orchestrator: fan-out across tracked websites.
//!
//! Per-website failures are captured into that website's outcome and never
//! abort the batch; only the initial website listing can fail the run as a
//! whole. Within one website the steps are strictly sequential: window →
//! token → fetch → row-by-row insert.

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use seopulse_core::AppConfig;
use seopulse_db::{
    performance, websites, DbError, NewPerformanceRow, WebsiteRow, PERFORMANCE_DATE_CONSTRAINT,
};
use seopulse_gsc::{retry, DailyDataPoint, GscClient};

use crate::token::TokenManager;
use crate::window;

/// The orchestrator only fails outright when it cannot even list the
/// websites to process.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to list tracked websites: {0}")]
    Db(#[from] DbError),
}

/// How one website's sync resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteStatus {
    Success,
    Error,
    Skipped,
}

/// Per-website result of a sync run.
#[derive(Debug, Clone)]
pub struct SiteOutcome {
    pub site_url: String,
    pub status: SiteStatus,
    pub message: String,
}

/// Aggregate counts across all per-website outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub total: usize,
    pub success: usize,
    pub error: usize,
    pub skipped: usize,
}

/// Tunables for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Scope the run to one user's websites, or sync every tracked website.
    pub user_id: Option<Uuid>,
    pub max_concurrent_sites: usize,
    pub lookback_days: u32,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl SyncOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig, user_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            max_concurrent_sites: config.sync_max_concurrent_sites,
            lookback_days: config.sync_lookback_days,
            max_retries: config.gsc_max_retries,
            retry_backoff_base_ms: config.gsc_retry_backoff_base_ms,
        }
    }
}

/// Syncs daily performance data for every tracked website, optionally scoped
/// to one user.
///
/// Websites are processed with bounded concurrency; each resolves to a
/// [`SiteOutcome`] regardless of what went wrong inside it. An empty website
/// list is a no-op, not an error.
///
/// # Errors
///
/// Returns [`SyncError::Db`] only if the tracked-website listing itself
/// fails.
pub async fn sync_all(
    pool: &PgPool,
    gsc: &GscClient,
    tokens: &TokenManager,
    options: &SyncOptions,
) -> Result<SyncStats, SyncError> {
    match options.user_id {
        Some(user_id) => tracing::info!(%user_id, "starting Search Console sync for user"),
        None => tracing::info!("starting Search Console sync for all tracked websites"),
    }

    let sites = websites::list_tracked_websites(pool, options.user_id).await?;
    if sites.is_empty() {
        tracing::info!("no tracked websites found; nothing to sync");
        return Ok(SyncStats::default());
    }

    tracing::info!(count = sites.len(), "found tracked websites to sync");

    let max_concurrent = options.max_concurrent_sites.max(1);
    // The stream is boxed to erase the mapping closure's type; keeping it
    // opaque trips an over-conservative auto-trait check when this future is
    // boxed by callers (rust-lang/rust#89976).
    let outcomes: Vec<SiteOutcome> = stream::iter(&sites)
        .map(|site| process_website(pool, gsc, tokens, options, site).boxed())
        .buffer_unordered(max_concurrent)
        .boxed()
        .collect()
        .await;

    for outcome in &outcomes {
        match outcome.status {
            SiteStatus::Error => {
                tracing::error!(site = %outcome.site_url, message = %outcome.message, "site sync failed");
            }
            SiteStatus::Success | SiteStatus::Skipped => {
                tracing::debug!(site = %outcome.site_url, message = %outcome.message, "site sync done");
            }
        }
    }

    let stats = aggregate(&outcomes);
    tracing::info!(
        total = stats.total,
        success = stats.success,
        error = stats.error,
        skipped = stats.skipped,
        "Search Console sync completed"
    );
    Ok(stats)
}

/// Folds per-website outcomes into aggregate counts.
#[must_use]
pub fn aggregate(outcomes: &[SiteOutcome]) -> SyncStats {
    let mut stats = SyncStats {
        total: outcomes.len(),
        ..SyncStats::default()
    };
    for outcome in outcomes {
        match outcome.status {
            SiteStatus::Success => stats.success += 1,
            SiteStatus::Error => stats.error += 1,
            SiteStatus::Skipped => stats.skipped += 1,
        }
    }
    stats
}

/// Runs the full window → token → fetch → insert sequence for one website.
///
/// Never returns an error: every failure mode becomes a `SiteStatus::Error`
/// outcome so sibling websites are unaffected.
async fn process_website(
    pool: &PgPool,
    gsc: &GscClient,
    tokens: &TokenManager,
    options: &SyncOptions,
    site: &WebsiteRow,
) -> SiteOutcome {
    let outcome = |status: SiteStatus, message: String| SiteOutcome {
        site_url: site.site_url.clone(),
        status,
        message,
    };

    let window = match window::determine_date_range(pool, site.id, options.lookback_days).await {
        Ok(window) => window,
        Err(e) => return outcome(SiteStatus::Error, e.to_string()),
    };

    if window.is_empty() {
        return outcome(SiteStatus::Skipped, "no new data to fetch".to_owned());
    }

    tracing::info!(
        site = %site.site_url,
        start = %window.start,
        end = %window.end,
        "fetching daily data"
    );

    let access_token = match tokens.valid_access_token(pool, site.user_id).await {
        Ok(token) => token,
        Err(e) => return outcome(SiteStatus::Error, e.to_string()),
    };

    let daily = match retry::retry_with_backoff(options.max_retries, options.retry_backoff_base_ms, || {
        gsc.daily_site_data(&site.site_url, window.start, window.end, &access_token)
    })
    .await
    {
        Ok(daily) => daily,
        Err(e) => return outcome(SiteStatus::Error, e.to_string()),
    };

    if daily.is_empty() {
        return outcome(SiteStatus::Success, "no new data available".to_owned());
    }

    match insert_days(pool, site.id, &daily).await {
        Ok((inserted, duplicates)) => outcome(
            SiteStatus::Success,
            format!("inserted {inserted} new data points ({duplicates} already stored)"),
        ),
        Err(e) => outcome(SiteStatus::Error, e.to_string()),
    }
}

/// Inserts the fetched days one at a time so that an already-stored day only
/// costs that single row, not the whole batch. Returns (inserted, duplicate)
/// counts.
///
/// Only a duplicate on the (website, date) unique index is benign; a
/// `Duplicate` naming any other constraint is a real persistence error and
/// propagates.
async fn insert_days(
    pool: &PgPool,
    website_id: i64,
    daily: &[DailyDataPoint],
) -> Result<(usize, usize), DbError> {
    let mut inserted = 0usize;
    let mut duplicates = 0usize;

    for day in daily {
        let row = NewPerformanceRow {
            website_id,
            date: day.date,
            clicks: day.clicks,
            impressions: day.impressions,
            ctr: day.ctr,
            position: day.position,
        };
        match performance::insert_performance_row(pool, &row).await {
            Ok(()) => inserted += 1,
            Err(DbError::Duplicate { ref constraint })
                if constraint == PERFORMANCE_DATE_CONSTRAINT =>
            {
                duplicates += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok((inserted, duplicates))
}
