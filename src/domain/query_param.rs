//! Compiled query parameters.
//!
//! [`QueryParams`] is the ordered `key=value` list produced by the
//! compiler. The same list drives the list-search request and the
//! shareable link, so order is preserved everywhere.

use std::fmt;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Key that turns a query into a point lookup.
pub const EVENT_ID_KEY: &str = "event_id";

/// Auto-managed result cap key.
pub const LIMIT_KEY: &str = "limit";

/// Request shape implied by a parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// `GET /v1/event/{id}`.
    PointLookup,
    /// `GET /v1/event?...`.
    List,
}

/// A single `key=value` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryParam {
    /// Parameter name as the backend expects it.
    pub key: String,
    /// Raw (unencoded) value.
    pub value: String,
}

impl QueryParam {
    /// Creates a parameter.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Ordered list of compiled parameters. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<QueryParam>);

impl QueryParams {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter at the end.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(QueryParam::new(key, value));
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the parameters in order.
    pub fn iter(&self) -> std::slice::Iter<'_, QueryParam> {
        self.0.iter()
    }

    /// Values of every parameter with the given key, in order.
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// First `event_id` value, if any. Later ones are ignored.
    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        self.values(EVENT_ID_KEY).next()
    }

    /// Point lookup if any `event_id` is present, list search otherwise.
    #[must_use]
    pub fn mode(&self) -> SearchMode {
        if self.event_id().is_some() {
            SearchMode::PointLookup
        } else {
            SearchMode::List
        }
    }

    /// Returns a copy with every `limit` entry removed.
    #[must_use]
    pub fn without_limit(&self) -> Self {
        Self(
            self.0
                .iter()
                .filter(|p| p.key != LIMIT_KEY)
                .cloned()
                .collect(),
        )
    }

    /// Returns a copy with stale `limit` entries removed and a single
    /// `limit=<limit>` appended last.
    #[must_use]
    pub fn with_limit(&self, limit: u32) -> Self {
        let mut params = self.without_limit();
        params.push(LIMIT_KEY, limit.to_string());
        params
    }

    /// Url-encoded `key=value&...` string in list order.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter().map(|p| (p.key.as_str(), p.value.as_str())))
            .finish()
    }

    /// Parses a query string (with or without a leading `?`) back into
    /// parameters, preserving order.
    #[must_use]
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| QueryParam::new(k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Appends every parameter to `url`'s query string.
    pub fn append_to(&self, url: &mut Url) {
        if self.0.is_empty() {
            return;
        }
        url.query_pairs_mut()
            .extend_pairs(self.0.iter().map(|p| (p.key.as_str(), p.value.as_str())));
    }
}

impl FromIterator<QueryParam> for QueryParams {
    fn from_iter<I: IntoIterator<Item = QueryParam>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for QueryParams {
    type Item = QueryParam;
    type IntoIter = std::vec::IntoIter<QueryParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryParams {
    type Item = &'a QueryParam;
    type IntoIter = std::slice::Iter<'a, QueryParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
