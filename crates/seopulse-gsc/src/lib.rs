//! HTTP client layer for the Google Search Console and OAuth token APIs.
//!
//! [`GscClient`] issues search-analytics queries and site listings against
//! the Webmasters v3 API; [`OauthClient`] exchanges refresh tokens at the
//! Google OAuth token endpoint. Both are explicitly constructed with their
//! own `reqwest` client and an injectable base URL so tests can point them
//! at a mock server. Neither holds credential state — bearer tokens are
//! passed per call.

mod client;
mod error;
mod filters;
mod oauth;
pub mod retry;
mod types;

pub use client::GscClient;
pub use error::GscError;
pub use filters::{branded_filter, DimensionFilter, FilterOperator};
pub use oauth::{OauthClient, RefreshedToken};
pub use types::{DailyDataPoint, DimensionPage, DimensionRequest, DimensionRow, SiteEntry};
