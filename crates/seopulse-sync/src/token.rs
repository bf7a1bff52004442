//! Access-token management for the Google provider.
//!
//! Guarantees a non-expired access token per user: tokens close to the wire
//! are read from the `accounts` table, refreshed through the OAuth token
//! endpoint when logically expired, and the refreshed token plus its new
//! absolute expiry are written back. No retries happen here; callers that
//! need resilience retry at a higher level.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use seopulse_core::OauthCredentials;
use seopulse_db::{accounts, AccountRow, DbError, GOOGLE_PROVIDER};
use seopulse_gsc::{GscError, OauthClient};

/// Errors from token lookup and refresh.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The user never connected a Google account.
    #[error("no Google account found for user")]
    NoAccount,

    /// The stored account has no refresh token, so an expired access token
    /// cannot be renewed.
    #[error("no refresh token stored for user's Google account")]
    NoRefreshToken,

    /// OAuth client id/secret are not configured in the environment.
    #[error("Google OAuth client credentials are not configured")]
    MissingCredentials,

    #[error(transparent)]
    Gsc(#[from] GscError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Obtains and refreshes access tokens for users' Google accounts.
///
/// Explicitly constructed with its OAuth client and credentials rather than
/// reading ambient environment state.
pub struct TokenManager {
    oauth: OauthClient,
    credentials: Option<OauthCredentials>,
}

impl TokenManager {
    #[must_use]
    pub fn new(oauth: OauthClient, credentials: Option<OauthCredentials>) -> Self {
        Self { oauth, credentials }
    }

    /// Returns a non-expired access token for the user, refreshing first if
    /// the stored one is logically expired or absent.
    ///
    /// # Errors
    ///
    /// - [`TokenError::NoAccount`] if the user has no Google account record.
    /// - Any refresh-path error when the stored token is not usable.
    pub async fn valid_access_token(
        &self,
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<String, TokenError> {
        let account = accounts::get_account(pool, user_id, GOOGLE_PROVIDER)
            .await?
            .ok_or(TokenError::NoAccount)?;

        if let Some(token) = live_token(&account, Utc::now().timestamp_millis()) {
            return Ok(token);
        }

        tracing::debug!(%user_id, "stored access token expired or absent, refreshing");
        self.refresh_account(pool, &account).await
    }

    /// Forces a refresh-token exchange for the user and persists the result.
    ///
    /// # Errors
    ///
    /// - [`TokenError::NoAccount`] / [`TokenError::NoRefreshToken`] if the
    ///   stored credential is missing or incomplete.
    /// - [`TokenError::MissingCredentials`] if no OAuth client id/secret
    ///   were configured.
    /// - [`TokenError::Gsc`] if the token endpoint rejects the exchange.
    pub async fn refresh_token(&self, pool: &PgPool, user_id: Uuid) -> Result<String, TokenError> {
        let account = accounts::get_account(pool, user_id, GOOGLE_PROVIDER)
            .await?
            .ok_or(TokenError::NoAccount)?;

        self.refresh_account(pool, &account).await
    }

    async fn refresh_account(
        &self,
        pool: &PgPool,
        account: &AccountRow,
    ) -> Result<String, TokenError> {
        let refresh_token = account
            .refresh_token
            .as_deref()
            .ok_or(TokenError::NoRefreshToken)?;
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(TokenError::MissingCredentials)?;

        let refreshed = self
            .oauth
            .refresh_access_token(
                &credentials.client_id,
                &credentials.client_secret,
                refresh_token,
            )
            .await?;

        let expires_at = Utc::now().timestamp() + refreshed.expires_in;
        accounts::update_account_token(pool, account.id, &refreshed.access_token, expires_at)
            .await?;

        tracing::info!(user_id = %account.user_id, expires_at, "refreshed Google access token");
        Ok(refreshed.access_token)
    }
}

/// Returns the stored access token if it is still usable at `now_ms`.
///
/// A token is expired iff `expires_at * 1000 < now_ms`; an account with no
/// expiry on record is treated as live, matching the provider's behaviour of
/// only sometimes reporting one.
fn live_token(account: &AccountRow, now_ms: i64) -> Option<String> {
    let expired = account
        .expires_at
        .is_some_and(|expires_at| expires_at * 1000 < now_ms);

    if expired {
        return None;
    }
    account.access_token.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(access_token: Option<&str>, expires_at: Option<i64>) -> AccountRow {
        AccountRow {
            id: 1,
            user_id: Uuid::new_v4(),
            provider: GOOGLE_PROVIDER.to_owned(),
            access_token: access_token.map(ToOwned::to_owned),
            refresh_token: Some("refresh".to_owned()),
            expires_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn future_expiry_keeps_stored_token() {
        let acct = account(Some("stored"), Some(2_000));
        assert_eq!(
            live_token(&acct, 1_999_999),
            Some("stored".to_owned()),
            "expires_at is epoch seconds, now is millis"
        );
    }

    #[test]
    fn past_expiry_forces_refresh() {
        let acct = account(Some("stored"), Some(1_000));
        assert_eq!(live_token(&acct, 1_000_001), None);
    }

    #[test]
    fn absent_access_token_forces_refresh() {
        let acct = account(None, Some(i64::MAX / 1_000));
        assert_eq!(live_token(&acct, 0), None);
    }

    #[test]
    fn missing_expiry_is_treated_as_live() {
        let acct = account(Some("stored"), None);
        assert_eq!(live_token(&acct, i64::MAX), Some("stored".to_owned()));
    }
}
