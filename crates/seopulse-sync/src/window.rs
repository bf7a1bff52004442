//! Incremental date-window computation.
//!
//! The external API does not reliably report same-day data, so windows end
//! at yesterday. The start picks up one day after the latest stored row, or
//! falls back to a fixed lookback for a website with no history.

use chrono::{Days, NaiveDate, Utc};
use sqlx::PgPool;

use seopulse_db::{performance, DbError};

/// An inclusive date range still missing for a website.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SyncWindow {
    /// True when there is nothing left to fetch (the latest stored row is
    /// already yesterday, or newer).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Yesterday in UTC, the newest day the API is expected to have.
#[must_use]
pub fn yesterday_utc() -> NaiveDate {
    Utc::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .unwrap_or(NaiveDate::MIN)
}

/// Computes the window to fetch given the latest stored date.
///
/// `latest + 1 day` when history exists, else `yesterday - lookback_days`;
/// the end is always `yesterday`. The result may be empty — callers check
/// [`SyncWindow::is_empty`] before fetching.
#[must_use]
pub fn sync_window(
    latest: Option<NaiveDate>,
    yesterday: NaiveDate,
    lookback_days: u32,
) -> SyncWindow {
    let start = match latest {
        Some(latest) => latest.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX),
        None => yesterday
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .unwrap_or(NaiveDate::MIN),
    };

    SyncWindow {
        start,
        end: yesterday,
    }
}

/// Looks up the website's latest stored date and computes its next window
/// against the current UTC date.
///
/// # Errors
///
/// Returns [`DbError`] if the latest-date query fails.
pub async fn determine_date_range(
    pool: &PgPool,
    website_id: i64,
    lookback_days: u32,
) -> Result<SyncWindow, DbError> {
    let latest = performance::latest_performance_date(pool, website_id).await?;
    Ok(sync_window(latest, yesterday_utc(), lookback_days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn no_history_falls_back_to_lookback() {
        let window = sync_window(None, day(2024, 6, 15), 30);
        assert_eq!(window.start, day(2024, 5, 16));
        assert_eq!(window.end, day(2024, 6, 15));
        assert!(!window.is_empty());
    }

    #[test]
    fn existing_history_resumes_the_day_after() {
        let window = sync_window(Some(day(2024, 6, 10)), day(2024, 6, 15), 30);
        assert_eq!(window.start, day(2024, 6, 11));
        assert_eq!(window.end, day(2024, 6, 15));
    }

    #[test]
    fn fully_caught_up_window_is_empty() {
        let window = sync_window(Some(day(2024, 6, 15)), day(2024, 6, 15), 30);
        assert_eq!(window.start, day(2024, 6, 16));
        assert!(window.is_empty());
    }

    #[test]
    fn month_boundary_rolls_over() {
        let window = sync_window(Some(day(2024, 6, 30)), day(2024, 7, 3), 30);
        assert_eq!(window.start, day(2024, 7, 1));
    }

    #[test]
    fn second_run_on_the_same_day_is_empty() {
        // First run for a fresh site on 2024-06-16 (yesterday = 06-15)
        // covers the 30-day lookback…
        let yesterday = day(2024, 6, 15);
        let first = sync_window(None, yesterday, 30);
        assert_eq!(first.start, day(2024, 5, 16));
        assert_eq!(first.end, day(2024, 6, 15));

        // …and once data through yesterday is stored, a second run the same
        // day has nothing to fetch.
        let second = sync_window(Some(first.end), yesterday, 30);
        assert_eq!(second.start, day(2024, 6, 16));
        assert!(second.is_empty());
    }
}
