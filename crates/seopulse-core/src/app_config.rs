#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// OAuth client credentials for the Google token endpoint.
///
/// Both halves are required to perform a refresh, so they travel together;
/// `AppConfig::oauth_credentials` is `None` when either env var is missing.
#[derive(Clone)]
pub struct OauthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub oauth_credentials: Option<OauthCredentials>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub gsc_request_timeout_secs: u64,
    pub gsc_max_retries: u32,
    pub gsc_retry_backoff_base_ms: u64,
    pub sync_max_concurrent_sites: usize,
    pub sync_lookback_days: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field(
                "oauth_credentials",
                &self.oauth_credentials.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("gsc_request_timeout_secs", &self.gsc_request_timeout_secs)
            .field("gsc_max_retries", &self.gsc_max_retries)
            .field("gsc_retry_backoff_base_ms", &self.gsc_retry_backoff_base_ms)
            .field(
                "sync_max_concurrent_sites",
                &self.sync_max_concurrent_sites,
            )
            .field("sync_lookback_days", &self.sync_lookback_days)
            .finish()
    }
}
