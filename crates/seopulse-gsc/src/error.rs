use thiserror::Error;

/// Errors returned by the Search Console and OAuth clients.
#[derive(Debug, Error)]
pub enum GscError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Search Console API returned a non-2xx status. `message` is the
    /// provider's `error.message` when the body was parseable, otherwise the
    /// HTTP status line.
    #[error("Search Console API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The OAuth token endpoint rejected a refresh-token exchange.
    #[error("token refresh failed: {0}")]
    TokenRefresh(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A 2xx response carried a payload the client cannot interpret, such as
    /// a row key that is not a calendar date.
    #[error("invalid response payload: {0}")]
    InvalidResponse(String),
}
