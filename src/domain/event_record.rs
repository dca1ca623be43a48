//! Event records and search response bodies.
//!
//! Every attribute is optional on the wire: missing or `null` fields
//! decode to empty values so that a sparse record still renders as a
//! row with empty cells.

use serde::{Deserialize, Deserializer, Serialize};

/// A single event as returned by the eventmaster API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Opaque identifier (string or integer on the wire).
    #[serde(default, deserialize_with = "string_or_number")]
    pub event_id: String,
    /// Topic the event was published under.
    #[serde(default, deserialize_with = "null_as_default")]
    pub topic_name: String,
    /// Datacenter.
    #[serde(default, deserialize_with = "null_as_default")]
    pub dc: String,
    /// Tags in backend order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag_set: Vec<String>,
    /// Event time in unix seconds (0 when absent).
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_time: i64,
    /// Originating host.
    #[serde(default, deserialize_with = "null_as_default")]
    pub host: String,
    /// Target hosts in backend order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_host_set: Vec<String>,
    /// User that emitted the event.
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,
    /// Parent event identifier (string or integer on the wire).
    #[serde(default, deserialize_with = "string_or_number")]
    pub parent_event_id: String,
    /// Time the backend received the event, in unix seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub received_time: i64,
    /// Opaque payload. Only shown in the detail view.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Body of `GET /v1/event?...`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching events, newest first. `null` decodes as empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<EventRecord>,
}

/// Body of `GET /v1/event/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupResponse {
    /// The event, or `None` when the id is unknown.
    #[serde(default)]
    pub result: Option<EventRecord>,
}

/// Outcome of one search request. Replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSet {
    /// Point lookup; `None` when the backend had no such event.
    Single(Option<EventRecord>),
    /// List search, at most `limit` records.
    List(Vec<EventRecord>),
}

impl ResultSet {
    /// Records in display order.
    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        match self {
            Self::Single(Some(record)) => std::slice::from_ref(record),
            Self::Single(None) => &[],
            Self::List(records) => records,
        }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Returns `true` if there is nothing to render.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

impl From<SearchResponse> for ResultSet {
    fn from(resp: SearchResponse) -> Self {
        Self::List(resp.results)
    }
}

impl From<LookupResponse> for ResultSet {
    fn from(resp: LookupResponse) -> Self {
        Self::Single(resp.result)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
