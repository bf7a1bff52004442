//! Dimension-filter construction for search-analytics queries.

use serde::Serialize;

/// Comparison operator for a dimension filter, serialized in the API's
/// SCREAMING_SNAKE_CASE form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    Contains,
    NotContains,
    Equals,
    NotEquals,
}

/// One constraint on a query dimension. Request-only; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionFilter {
    pub dimension: String,
    pub operator: FilterOperator,
    pub expression: String,
}

/// Builds the branded/non-branded `query` filter from a keyword list.
///
/// The expression is a regex alternation of the keywords with special
/// characters escaped, e.g. `["Acme", "Acme+"]` → `Acme|Acme\+`. `branded`
/// selects `CONTAINS` (branded traffic) or `NOT_CONTAINS` (everything else).
/// An empty keyword list yields an empty vec, which callers must treat as
/// "no filter".
#[must_use]
pub fn branded_filter(branded_keywords: &[String], branded: bool) -> Vec<DimensionFilter> {
    if branded_keywords.is_empty() {
        return Vec::new();
    }

    let pattern = branded_keywords
        .iter()
        .map(|kw| regex::escape(kw))
        .collect::<Vec<_>>()
        .join("|");

    vec![DimensionFilter {
        dimension: "query".to_owned(),
        operator: if branded {
            FilterOperator::Contains
        } else {
            FilterOperator::NotContains
        },
        expression: pattern,
    }]
}
