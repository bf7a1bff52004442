//! Database operations for the `daily_performance_data` table.
//!
//! Rows are append-only: one aggregate per (website, calendar day), inserted
//! exclusively by the sync orchestrator and never updated or deleted.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Name of the unique index guarding one row per (website, date).
///
/// [`insert_performance_row`] maps a violation of exactly this constraint to
/// [`DbError::Duplicate`]; violations of any other constraint surface as
/// ordinary persistence errors.
pub const PERFORMANCE_DATE_CONSTRAINT: &str = "daily_performance_website_date_key";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `daily_performance_data` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PerformanceRow {
    pub id: i64,
    pub website_id: i64,
    pub date: NaiveDate,
    pub clicks: i64,
    pub impressions: i64,
    pub ctr: f64,
    pub position: f64,
    pub created_at: DateTime<Utc>,
}

/// Values for a new daily aggregate, prior to insertion.
#[derive(Debug, Clone)]
pub struct NewPerformanceRow {
    pub website_id: i64,
    pub date: NaiveDate,
    pub clicks: i64,
    pub impressions: i64,
    pub ctr: f64,
    pub position: f64,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the most recent stored date for a website, or `None` if the
/// website has no performance data yet.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_performance_date(
    pool: &PgPool,
    website_id: i64,
) -> Result<Option<NaiveDate>, DbError> {
    let date = sqlx::query_scalar::<_, NaiveDate>(
        "SELECT date FROM daily_performance_data \
         WHERE website_id = $1 \
         ORDER BY date DESC \
         LIMIT 1",
    )
    .bind(website_id)
    .fetch_optional(pool)
    .await?;

    Ok(date)
}

/// Inserts one daily aggregate row.
///
/// # Errors
///
/// Returns [`DbError::Duplicate`] if a row already exists for this
/// (website, date) pair, or [`DbError::Sqlx`] for any other failure.
pub async fn insert_performance_row(pool: &PgPool, row: &NewPerformanceRow) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO daily_performance_data \
             (website_id, date, clicks, impressions, ctr, position) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(row.website_id)
    .bind(row.date)
    .bind(row.clicks)
    .bind(row.impressions)
    .bind(row.ctr)
    .bind(row.position)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns the stored aggregates for a website within an inclusive date
/// range, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_performance_rows(
    pool: &PgPool,
    website_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PerformanceRow>, DbError> {
    let rows = sqlx::query_as::<_, PerformanceRow>(
        "SELECT id, website_id, date, clicks, impressions, ctr, position, created_at \
         FROM daily_performance_data \
         WHERE website_id = $1 AND date >= $2 AND date <= $3 \
         ORDER BY date",
    )
    .bind(website_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Reports whether any of a user's tracked websites have performance data in
/// the given inclusive date range.
///
/// Used by onboarding flows to decide whether a first sync is still needed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn has_performance_data(
    pool: &PgPool,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<bool, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM daily_performance_data d \
         JOIN websites w ON w.id = d.website_id \
         WHERE w.user_id = $1 AND w.tracked = true \
           AND d.date >= $2 AND d.date <= $3",
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}
