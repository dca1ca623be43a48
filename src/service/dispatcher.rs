//! Search dispatcher: picks the request shape and issues it.

use crate::client::EventApi;
use crate::domain::{QueryParams, ResultSet, SearchMode};
use crate::error::ConsoleError;

/// A planned request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRequest {
    /// `GET /v1/event/{event_id}`; every other parameter is dropped.
    PointLookup {
        /// Id from the first `event_id` parameter.
        event_id: String,
    },
    /// `GET /v1/event?...` with a single trailing `limit`.
    List {
        /// Compiled parameters plus `limit`, in order.
        params: QueryParams,
    },
}

impl SearchRequest {
    /// Plans the request for `params`.
    ///
    /// Any `event_id` makes this a point lookup on the first one. Otherwise
    /// stale `limit` entries are removed and `limit=<limit>` is appended.
    #[must_use]
    pub fn plan(params: &QueryParams, limit: u32) -> Self {
        match params.event_id() {
            Some(event_id) => Self::PointLookup {
                event_id: event_id.to_string(),
            },
            None => Self::List {
                params: params.with_limit(limit),
            },
        }
    }

    /// Request shape.
    #[must_use]
    pub const fn mode(&self) -> SearchMode {
        match self {
            Self::PointLookup { .. } => SearchMode::PointLookup,
            Self::List { .. } => SearchMode::List,
        }
    }
}

/// Issues `request` against `api`.
///
/// # Errors
///
/// Propagates the [`ConsoleError`] from the API; nothing is rendered on
/// failure.
pub async fn dispatch<A: EventApi>(
    api: &A,
    request: &SearchRequest,
) -> Result<ResultSet, ConsoleError> {
    match request {
        SearchRequest::PointLookup { event_id } => {
            tracing::debug!(%event_id, "point lookup");
            Ok(api.lookup(event_id).await?.into())
        }
        SearchRequest::List { params } => {
            tracing::debug!(params = %params.to_query_string(), "list search");
            Ok(api.search(params).await?.into())
        }
    }
}
