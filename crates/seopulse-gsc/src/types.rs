//! Wire types for the Webmasters v3 `searchAnalytics/query` contract.
//!
//! Request bodies serialize with camelCase keys; optional fields are omitted
//! entirely rather than sent as `null`, matching what the API accepts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::filters::DimensionFilter;

/// Body for a `searchAnalytics/query` POST.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryRequest {
    pub start_date: String,
    pub end_date: String,
    pub dimensions: Vec<String>,
    pub row_limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_row: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_filter_groups: Option<Vec<FilterGroup>>,
}

/// A single filter group. The API accepts only one group per request and
/// ANDs the filters within it.
#[derive(Debug, Serialize)]
pub(crate) struct FilterGroup {
    pub filters: Vec<DimensionFilter>,
}

/// Response envelope: `rows` is absent when the range has no data.
#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub rows: Vec<ApiRow>,
}

/// One analytics row as returned by the API. Metric counts arrive as JSON
/// numbers; clicks and impressions are whole numbers in practice but are
/// deserialized as `f64` to tolerate the API's number formatting.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiRow {
    pub keys: Vec<String>,
    pub clicks: f64,
    pub impressions: f64,
    pub ctr: f64,
    pub position: f64,
}

/// Response envelope for the site-list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SiteListResponse {
    #[serde(default)]
    pub site_entry: Vec<SiteEntry>,
}

/// One property the authenticated user can see in Search Console.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteEntry {
    pub site_url: String,
    #[serde(default)]
    pub permission_level: Option<String>,
}

/// One day of aggregate site metrics from the `date` dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyDataPoint {
    pub date: NaiveDate,
    pub clicks: i64,
    pub impressions: i64,
    pub ctr: f64,
    pub position: f64,
}

/// Parameters for a dimension query beyond the site and date range.
#[derive(Debug, Clone)]
pub struct DimensionRequest {
    pub dimensions: Vec<String>,
    pub filters: Vec<DimensionFilter>,
    pub row_limit: u32,
    pub start_row: u32,
}

impl Default for DimensionRequest {
    fn default() -> Self {
        Self {
            dimensions: Vec::new(),
            filters: Vec::new(),
            row_limit: 100,
            start_row: 0,
        }
    }
}

/// One normalized dimension row: dimension name → key value, plus metrics.
#[derive(Debug, Clone)]
pub struct DimensionRow {
    pub keys: BTreeMap<String, String>,
    pub clicks: i64,
    pub impressions: i64,
    pub ctr: f64,
    pub position: f64,
}

/// One page of dimension results.
///
/// `has_next_page` is a heuristic: the API returns no total count, so a page
/// filled exactly to `row_limit` is taken to mean more rows may follow.
#[derive(Debug, Clone)]
pub struct DimensionPage {
    pub rows: Vec<DimensionRow>,
    pub total_rows: usize,
    pub has_next_page: bool,
}
