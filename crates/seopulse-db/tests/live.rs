//! Live integration tests for seopulse-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/seopulse-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use chrono::NaiveDate;
use seopulse_db::{
    get_account, get_website_by_url, has_performance_data, insert_performance_row,
    latest_performance_date, list_performance_rows, list_tracked_websites, set_tracked,
    upsert_tracked_website, DbError, NewPerformanceRow, GOOGLE_PROVIDER,
    PERFORMANCE_DATE_CONSTRAINT,
};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn performance_row(website_id: i64, date: NaiveDate) -> NewPerformanceRow {
    NewPerformanceRow {
        website_id,
        date,
        clicks: 10,
        impressions: 500,
        ctr: 0.02,
        position: 8.3,
    }
}

/// Insert a minimal Google account row for a user and return its id.
async fn insert_test_account(pool: &sqlx::PgPool, user_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO accounts (user_id, provider, access_token, refresh_token, expires_at) \
         VALUES ($1, 'google', 'stored-token', 'stored-refresh', 1000) RETURNING id",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_test_account failed for user {user_id}: {e}"))
}

// ---------------------------------------------------------------------------
// websites
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_website_creates_then_reenables(pool: sqlx::PgPool) {
    let user_id = Uuid::new_v4();

    let created = upsert_tracked_website(&pool, user_id, "https://example.com/", Some("Example"))
        .await
        .expect("initial upsert should succeed");
    assert!(created.tracked);
    assert_eq!(created.user_id, user_id);

    set_tracked(&pool, created.id, false)
        .await
        .expect("toggle off should succeed");

    // Re-tracking the same URL (even from another user) flips the flag back
    // on instead of creating a second record.
    let other_user = Uuid::new_v4();
    let again = upsert_tracked_website(&pool, other_user, "https://example.com/", None)
        .await
        .expect("second upsert should succeed");
    assert_eq!(again.id, created.id);
    assert!(again.tracked);
    assert_eq!(again.user_id, user_id, "ownership is not transferred");
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_tracked_websites_honours_user_scope(pool: sqlx::PgPool) {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    upsert_tracked_website(&pool, alice, "https://alice.example/", None)
        .await
        .expect("upsert alice");
    let untracked = upsert_tracked_website(&pool, alice, "https://alice-old.example/", None)
        .await
        .expect("upsert alice-old");
    set_tracked(&pool, untracked.id, false)
        .await
        .expect("untrack alice-old");
    upsert_tracked_website(&pool, bob, "https://bob.example/", None)
        .await
        .expect("upsert bob");

    let all = list_tracked_websites(&pool, None)
        .await
        .expect("global listing");
    assert_eq!(all.len(), 2, "untracked site must not appear");

    let alice_only = list_tracked_websites(&pool, Some(alice))
        .await
        .expect("scoped listing");
    assert_eq!(alice_only.len(), 1);
    assert_eq!(alice_only[0].site_url, "https://alice.example/");

    let found = get_website_by_url(&pool, "https://bob.example/")
        .await
        .expect("lookup");
    assert!(found.is_some());
}

// ---------------------------------------------------------------------------
// daily_performance_data
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_day_maps_to_typed_duplicate_error(pool: sqlx::PgPool) {
    let user_id = Uuid::new_v4();
    let site = upsert_tracked_website(&pool, user_id, "https://example.com/", None)
        .await
        .expect("upsert site");

    let row = performance_row(site.id, day(2024, 6, 14));
    insert_performance_row(&pool, &row)
        .await
        .expect("first insert should succeed");

    let err = insert_performance_row(&pool, &row)
        .await
        .expect_err("second insert must hit the unique constraint");
    match err {
        DbError::Duplicate { constraint } => {
            assert_eq!(constraint, PERFORMANCE_DATE_CONSTRAINT);
        }
        other => panic!("expected Duplicate, got: {other:?}"),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn latest_date_and_range_listing(pool: sqlx::PgPool) {
    let user_id = Uuid::new_v4();
    let site = upsert_tracked_website(&pool, user_id, "https://example.com/", None)
        .await
        .expect("upsert site");

    assert_eq!(
        latest_performance_date(&pool, site.id)
            .await
            .expect("query latest"),
        None
    );

    for d in [day(2024, 6, 12), day(2024, 6, 14), day(2024, 6, 13)] {
        insert_performance_row(&pool, &performance_row(site.id, d))
            .await
            .expect("insert");
    }

    assert_eq!(
        latest_performance_date(&pool, site.id)
            .await
            .expect("query latest"),
        Some(day(2024, 6, 14))
    );

    let rows = list_performance_rows(&pool, site.id, day(2024, 6, 13), day(2024, 6, 14))
        .await
        .expect("range listing");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, day(2024, 6, 13), "oldest first");

    assert!(has_performance_data(&pool, user_id, day(2024, 6, 1), day(2024, 6, 30))
        .await
        .expect("has data"));
    assert!(!has_performance_data(&pool, user_id, day(2024, 7, 1), day(2024, 7, 31))
        .await
        .expect("no data in july"));
}

// ---------------------------------------------------------------------------
// accounts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn account_lookup_and_token_update(pool: sqlx::PgPool) {
    let user_id = Uuid::new_v4();
    let account_id = insert_test_account(&pool, user_id).await;

    let account = get_account(&pool, user_id, GOOGLE_PROVIDER)
        .await
        .expect("lookup")
        .expect("account exists");
    assert_eq!(account.id, account_id);
    assert_eq!(account.access_token.as_deref(), Some("stored-token"));
    assert_eq!(account.expires_at, Some(1000));

    update_account_token_roundtrip(&pool, account_id, user_id).await;

    let missing = get_account(&pool, Uuid::new_v4(), GOOGLE_PROVIDER)
        .await
        .expect("lookup");
    assert!(missing.is_none());
}

async fn update_account_token_roundtrip(pool: &sqlx::PgPool, account_id: i64, user_id: Uuid) {
    seopulse_db::update_account_token(pool, account_id, "fresh-token", 2_000_000_000)
        .await
        .expect("update");

    let account = get_account(pool, user_id, GOOGLE_PROVIDER)
        .await
        .expect("lookup")
        .expect("account exists");
    assert_eq!(account.access_token.as_deref(), Some("fresh-token"));
    assert_eq!(account.expires_at, Some(2_000_000_000));
    assert_eq!(
        account.refresh_token.as_deref(),
        Some("stored-refresh"),
        "refresh token is never rotated"
    );
}
