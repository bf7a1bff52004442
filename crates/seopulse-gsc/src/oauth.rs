//! Client for the Google OAuth2 token endpoint.
//!
//! Only the `refresh_token` grant is implemented — initial sign-in and
//! consent are handled elsewhere; this service only keeps already-issued
//! access tokens alive.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::GscError;

const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Successful token-endpoint exchange: the fresh access token and its
/// lifetime in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshedToken {
    pub access_token: String,
    pub expires_in: i64,
}

/// Shape of a token-endpoint failure body.
#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Client for the OAuth2 token endpoint.
pub struct OauthClient {
    client: Client,
    token_url: Url,
}

impl OauthClient {
    /// Creates a client pointed at the production Google token endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`GscError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, GscError> {
        Self::with_token_url(timeout_secs, DEFAULT_TOKEN_URL)
    }

    /// Creates a client with a custom token URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GscError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GscError::InvalidResponse`] if `token_url`
    /// is not a valid URL.
    pub fn with_token_url(timeout_secs: u64, token_url: &str) -> Result<Self, GscError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("seopulse/0.1 (search-analytics-sync)")
            .build()?;

        let token_url = Url::parse(token_url)
            .map_err(|e| GscError::InvalidResponse(format!("invalid token URL: {e}")))?;

        Ok(Self { client, token_url })
    }

    /// Exchanges a long-lived refresh token for a fresh access token.
    ///
    /// Sends the form-encoded `grant_type=refresh_token` request the endpoint
    /// expects. The caller is responsible for persisting the returned token
    /// and computing its absolute expiry.
    ///
    /// # Errors
    ///
    /// - [`GscError::TokenRefresh`] on a non-2xx response, preferring the
    ///   endpoint's `error_description`, then `error`, then the HTTP status.
    /// - [`GscError::Http`] on network failure.
    /// - [`GscError::Deserialize`] if a 2xx body does not match the expected shape.
    pub async fn refresh_access_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<RefreshedToken, GscError> {
        let form = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(self.token_url.clone())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<TokenErrorBody>(&text)
                .ok()
                .and_then(|body| body.error_description.or(body.error))
                .unwrap_or_else(|| status.to_string());
            return Err(GscError::TokenRefresh(detail));
        }

        serde_json::from_str(&text).map_err(|e| GscError::Deserialize {
            context: self.token_url.to_string(),
            source: e,
        })
    }
}
