//! Access to the eventmaster HTTP API.
//!
//! [`EventApi`] is the seam between the query pipeline and the backend.
//! [`HttpEventApi`] talks to a real server over `reqwest`; tests swap in
//! an in-memory fake.

pub mod http;

#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;

use crate::domain::{LookupResponse, QueryParams, SearchResponse};
use crate::error::ConsoleError;

pub use http::HttpEventApi;

/// Read-only operations the console needs from the backend.
pub trait EventApi: Send + Sync {
    /// `GET /v1/event?<params>` with `params` sent verbatim, in order.
    fn search(
        &self,
        params: &QueryParams,
    ) -> impl Future<Output = Result<SearchResponse, ConsoleError>> + Send;

    /// `GET /v1/event/{event_id}`.
    fn lookup(
        &self,
        event_id: &str,
    ) -> impl Future<Output = Result<LookupResponse, ConsoleError>> + Send;
}
