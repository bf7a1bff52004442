//! HTTP client for the Search Console (Webmasters v3) REST API.
//!
//! Wraps `reqwest` with the API's error envelope handling and normalizes
//! paginated query responses into flat rows. Bearer tokens are supplied per
//! call; the client itself is credential-free.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Url};

use crate::error::GscError;
use crate::types::{
    ApiRow, DailyDataPoint, DimensionPage, DimensionRequest, DimensionRow, FilterGroup,
    QueryRequest, QueryResponse, SiteEntry, SiteListResponse,
};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/webmasters/v3/";

/// The API ignores requests for more than 5000 rows, so the daily query asks
/// for exactly that ceiling to cover any realistic backfill window.
const DAILY_ROW_LIMIT: u32 = 5000;

/// Percent-encoding set matching JavaScript's `encodeURIComponent`: every
/// byte except ASCII alphanumerics and `- _ . ! ~ * ' ( )`. Site URLs embed
/// `https://…/`, so `:` and `/` must be encoded inside the path segment.
const SITE_URL_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Client for the Search Console REST API.
///
/// Use [`GscClient::new`] for production or [`GscClient::with_base_url`] to
/// point at a mock server in tests.
pub struct GscClient {
    client: Client,
    base_url: Url,
}

impl GscClient {
    /// Creates a new client pointed at the production Search Console API.
    ///
    /// # Errors
    ///
    /// Returns [`GscError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, GscError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GscError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GscError::InvalidResponse`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, GscError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("seopulse/0.1 (search-analytics-sync)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // joins append below the base path rather than replacing its last
        // segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| GscError::InvalidResponse(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Fetches per-day aggregate metrics for a site over an inclusive date
    /// range, using the single `date` dimension.
    ///
    /// A response with no `rows` yields an empty vec — the caller decides
    /// whether "no data" is noteworthy.
    ///
    /// # Errors
    ///
    /// - [`GscError::Api`] on a non-2xx response, carrying the provider's
    ///   `error.message` when parseable.
    /// - [`GscError::Http`] on network failure.
    /// - [`GscError::Deserialize`] if the body does not match the expected shape.
    /// - [`GscError::InvalidResponse`] if a row key is not a calendar date.
    pub async fn daily_site_data(
        &self,
        site_url: &str,
        start: NaiveDate,
        end: NaiveDate,
        access_token: &str,
    ) -> Result<Vec<DailyDataPoint>, GscError> {
        let body = QueryRequest {
            start_date: start.format("%Y-%m-%d").to_string(),
            end_date: end.format("%Y-%m-%d").to_string(),
            dimensions: vec!["date".to_owned()],
            row_limit: DAILY_ROW_LIMIT,
            start_row: None,
            dimension_filter_groups: None,
        };

        let url = self.query_url(site_url)?;
        let response = self.post_query(&url, access_token, &body).await?;

        response.rows.iter().map(daily_point).collect()
    }

    /// Runs a query over an arbitrary dimension set (query/page/country/
    /// device …), with optional filters and pagination.
    ///
    /// Filters are sent as a single `dimensionFilterGroups` entry; the API
    /// ANDs the filters within that group. `has_next_page` on the returned
    /// page is the row-count heuristic documented on [`DimensionPage`].
    ///
    /// # Errors
    ///
    /// Same error conditions as [`GscClient::daily_site_data`].
    pub async fn dimension_data(
        &self,
        site_url: &str,
        start: NaiveDate,
        end: NaiveDate,
        request: &DimensionRequest,
        access_token: &str,
    ) -> Result<DimensionPage, GscError> {
        let filter_groups = if request.filters.is_empty() {
            None
        } else {
            Some(vec![FilterGroup {
                filters: request.filters.clone(),
            }])
        };

        let body = QueryRequest {
            start_date: start.format("%Y-%m-%d").to_string(),
            end_date: end.format("%Y-%m-%d").to_string(),
            dimensions: request.dimensions.clone(),
            row_limit: request.row_limit,
            start_row: Some(request.start_row),
            dimension_filter_groups: filter_groups,
        };

        let url = self.query_url(site_url)?;
        let response = self.post_query(&url, access_token, &body).await?;

        let rows = response
            .rows
            .iter()
            .map(|row| dimension_row(&request.dimensions, row))
            .collect::<Result<Vec<_>, _>>()?;

        let total_rows = rows.len();
        let has_next_page = total_rows == request.row_limit as usize;

        Ok(DimensionPage {
            rows,
            total_rows,
            has_next_page,
        })
    }

    /// Lists the properties visible to the authenticated user.
    ///
    /// # Errors
    ///
    /// - [`GscError::Api`] on a non-2xx response.
    /// - [`GscError::Http`] on network failure.
    /// - [`GscError::Deserialize`] if the body does not match the expected shape.
    pub async fn list_sites(&self, access_token: &str) -> Result<Vec<SiteEntry>, GscError> {
        let url = self
            .base_url
            .join("sites")
            .map_err(|e| GscError::InvalidResponse(format!("invalid sites URL: {e}")))?;

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(access_token)
            .send()
            .await?;

        let body = Self::read_success_body(response).await?;
        let parsed: SiteListResponse =
            serde_json::from_str(&body).map_err(|e| GscError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        Ok(parsed.site_entry)
    }

    /// Builds the `searchAnalytics/query` URL with the site URL encoded as a
    /// single path segment.
    fn query_url(&self, site_url: &str) -> Result<Url, GscError> {
        let encoded = utf8_percent_encode(site_url, SITE_URL_SET).to_string();
        self.base_url
            .join(&format!("sites/{encoded}/searchAnalytics/query"))
            .map_err(|e| GscError::InvalidResponse(format!("invalid site URL '{site_url}': {e}")))
    }

    /// POSTs a query body with bearer auth and parses the JSON response.
    async fn post_query(
        &self,
        url: &Url,
        access_token: &str,
        body: &QueryRequest,
    ) -> Result<QueryResponse, GscError> {
        let response = self
            .client
            .post(url.clone())
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        let body = Self::read_success_body(response).await?;
        serde_json::from_str(&body).map_err(|e| GscError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Returns the body text of a 2xx response, or maps a non-2xx response to
    /// [`GscError::Api`] with the provider's structured message when one can
    /// be parsed out of the body.
    async fn read_success_body(response: reqwest::Response) -> Result<String, GscError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| {
                v.get("error")?
                    .get("message")?
                    .as_str()
                    .map(ToOwned::to_owned)
            })
            .unwrap_or_else(|| status.to_string());

        Err(GscError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Converts one `date`-dimension row into a [`DailyDataPoint`].
fn daily_point(row: &ApiRow) -> Result<DailyDataPoint, GscError> {
    let key = row
        .keys
        .first()
        .ok_or_else(|| GscError::InvalidResponse("row has no dimension key".to_owned()))?;
    let date = NaiveDate::parse_from_str(key, "%Y-%m-%d")
        .map_err(|e| GscError::InvalidResponse(format!("bad date key '{key}': {e}")))?;

    Ok(DailyDataPoint {
        date,
        clicks: whole_metric(row.clicks),
        impressions: whole_metric(row.impressions),
        ctr: row.ctr,
        position: row.position,
    })
}

/// Converts one arbitrary-dimension row, pairing each requested dimension
/// name with its positional key.
fn dimension_row(dimensions: &[String], row: &ApiRow) -> Result<DimensionRow, GscError> {
    if row.keys.len() < dimensions.len() {
        return Err(GscError::InvalidResponse(format!(
            "row has {} keys for {} dimensions",
            row.keys.len(),
            dimensions.len()
        )));
    }

    let keys: BTreeMap<String, String> = dimensions
        .iter()
        .cloned()
        .zip(row.keys.iter().cloned())
        .collect();

    Ok(DimensionRow {
        keys,
        clicks: whole_metric(row.clicks),
        impressions: whole_metric(row.impressions),
        ctr: row.ctr,
        position: row.position,
    })
}

/// Click and impression counts are integral; the API just happens to ship
/// them as JSON numbers.
#[allow(clippy::cast_possible_truncation)]
fn whole_metric(value: f64) -> i64 {
    value.round().max(0.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> GscClient {
        GscClient::with_base_url(30, base_url).expect("client construction should not fail")
    }

    #[test]
    fn query_url_encodes_site_url_as_one_segment() {
        let client = test_client("https://www.googleapis.com/webmasters/v3");
        let url = client
            .query_url("https://example.com/")
            .expect("url should build");
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/webmasters/v3/sites/https%3A%2F%2Fexample.com%2F/searchAnalytics/query"
        );
    }

    #[test]
    fn query_url_handles_domain_properties() {
        let client = test_client("https://www.googleapis.com/webmasters/v3/");
        let url = client
            .query_url("sc-domain:example.com")
            .expect("url should build");
        assert!(
            url.as_str().contains("sites/sc-domain%3Aexample.com/"),
            "colon must be encoded: {url}"
        );
    }

    #[test]
    fn daily_point_parses_date_key() {
        let row = ApiRow {
            keys: vec!["2024-06-15".to_owned()],
            clicks: 12.0,
            impressions: 340.0,
            ctr: 0.035,
            position: 9.2,
        };
        let point = daily_point(&row).expect("should parse");
        assert_eq!(point.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(point.clicks, 12);
        assert_eq!(point.impressions, 340);
    }

    #[test]
    fn daily_point_rejects_non_date_key() {
        let row = ApiRow {
            keys: vec!["mobile".to_owned()],
            clicks: 1.0,
            impressions: 2.0,
            ctr: 0.5,
            position: 1.0,
        };
        assert!(matches!(
            daily_point(&row),
            Err(GscError::InvalidResponse(_))
        ));
    }

    #[test]
    fn dimension_row_pairs_names_with_keys() {
        let dimensions = vec!["query".to_owned(), "device".to_owned()];
        let row = ApiRow {
            keys: vec!["acme pricing".to_owned(), "MOBILE".to_owned()],
            clicks: 3.0,
            impressions: 80.0,
            ctr: 0.0375,
            position: 4.1,
        };
        let normalized = dimension_row(&dimensions, &row).expect("should map");
        assert_eq!(normalized.keys["query"], "acme pricing");
        assert_eq!(normalized.keys["device"], "MOBILE");
    }

    #[test]
    fn dimension_row_rejects_short_key_list() {
        let dimensions = vec!["query".to_owned(), "device".to_owned()];
        let row = ApiRow {
            keys: vec!["acme pricing".to_owned()],
            clicks: 0.0,
            impressions: 0.0,
            ctr: 0.0,
            position: 0.0,
        };
        assert!(dimension_row(&dimensions, &row).is_err());
    }
}
