//! Database operations for the `accounts` table (OAuth credentials).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Provider key for Google OAuth accounts. Each user is expected to hold at
/// most one record per provider.
pub const GOOGLE_PROVIDER: &str = "google";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `accounts` table.
///
/// `expires_at` is epoch seconds as returned by the OAuth token endpoint;
/// the access token and expiry are rewritten in place on refresh while the
/// refresh token is long-lived.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub user_id: Uuid,
    pub provider: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the user's account record for a provider, or `None` if the user
/// never connected that provider.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_account(
    pool: &PgPool,
    user_id: Uuid,
    provider: &str,
) -> Result<Option<AccountRow>, DbError> {
    let row = sqlx::query_as::<_, AccountRow>(
        "SELECT id, user_id, provider, access_token, refresh_token, expires_at, created_at \
         FROM accounts \
         WHERE user_id = $1 AND provider = $2",
    )
    .bind(user_id)
    .bind(provider)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Stores a freshly refreshed access token and its new expiry on an account.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no account exists with the given `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_account_token(
    pool: &PgPool,
    id: i64,
    access_token: &str,
    expires_at: i64,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE accounts \
         SET access_token = $1, expires_at = $2 \
         WHERE id = $3",
    )
    .bind(access_token)
    .bind(expires_at)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
