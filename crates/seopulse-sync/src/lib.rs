//! Incremental Search Console sync.
//!
//! Three pieces, layered leaves-first: [`token::TokenManager`] keeps a
//! non-expired access token per user, [`window`] decides what date range a
//! website is still missing, and [`run::sync_all`] fans out across tracked
//! websites with bounded concurrency and per-website fault isolation.

pub mod run;
pub mod token;
pub mod window;

pub use run::{sync_all, SiteOutcome, SiteStatus, SyncError, SyncOptions, SyncStats};
pub use token::{TokenManager, TokenError};
pub use window::{sync_window, yesterday_utc, SyncWindow};
