//! Database operations for the `websites` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `websites` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WebsiteRow {
    pub id: i64,
    pub public_id: Uuid,
    pub user_id: Uuid,
    pub site_url: String,
    pub name: Option<String>,
    pub tracked: bool,
    pub created_at: DateTime<Utc>,
}

const WEBSITE_COLUMNS: &str = "id, public_id, user_id, site_url, name, tracked, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all websites with `tracked = true`, optionally scoped to one user.
///
/// The cron-style global sync passes `None`; user-initiated syncs pass the
/// user's id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_tracked_websites(
    pool: &PgPool,
    user_id: Option<Uuid>,
) -> Result<Vec<WebsiteRow>, DbError> {
    let rows = match user_id {
        Some(user_id) => {
            sqlx::query_as::<_, WebsiteRow>(&format!(
                "SELECT {WEBSITE_COLUMNS} FROM websites \
                 WHERE tracked = true AND user_id = $1 \
                 ORDER BY site_url"
            ))
            .bind(user_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, WebsiteRow>(&format!(
                "SELECT {WEBSITE_COLUMNS} FROM websites \
                 WHERE tracked = true \
                 ORDER BY site_url"
            ))
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}

/// Returns a single website by its canonical site URL, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_website_by_url(pool: &PgPool, site_url: &str) -> Result<Option<WebsiteRow>, DbError> {
    let row = sqlx::query_as::<_, WebsiteRow>(&format!(
        "SELECT {WEBSITE_COLUMNS} FROM websites WHERE site_url = $1"
    ))
    .bind(site_url)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a tracked website, or re-enables tracking if the URL is already
/// registered.
///
/// Site URLs are unique system-wide, so tracking an existing URL flips its
/// `tracked` flag back on rather than creating a second record. Returns the
/// resulting row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_tracked_website(
    pool: &PgPool,
    user_id: Uuid,
    site_url: &str,
    name: Option<&str>,
) -> Result<WebsiteRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, WebsiteRow>(&format!(
        "INSERT INTO websites (public_id, user_id, site_url, name, tracked) \
         VALUES ($1, $2, $3, $4, true) \
         ON CONFLICT (site_url) DO UPDATE SET tracked = true \
         RETURNING {WEBSITE_COLUMNS}"
    ))
    .bind(public_id)
    .bind(user_id)
    .bind(site_url)
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Sets the `tracked` flag for a website.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no website exists with the given `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_tracked(pool: &PgPool, id: i64, tracked: bool) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE websites SET tracked = $1 WHERE id = $2")
        .bind(tracked)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
