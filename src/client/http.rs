//! `reqwest`-backed implementation of [`EventApi`].

use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;

use super::EventApi;
use crate::config::ConsoleConfig;
use crate::domain::{LookupResponse, QueryParams, SearchResponse};
use crate::error::ConsoleError;

/// HTTP client for the eventmaster API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct HttpEventApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpEventApi {
    /// Creates a client for `base_url`.
    ///
    /// `timeout` of `None` keeps the `reqwest` default (no timeout).
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::InvalidUrl`] if `base_url` cannot carry a
    /// path, or [`ConsoleError::Transport`] if the client cannot be built.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, ConsoleError> {
        if base_url.cannot_be_a_base() {
            return Err(ConsoleError::InvalidUrl(base_url.to_string()));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, base_url })
    }

    /// Creates a client from the loaded configuration.
    ///
    /// # Errors
    ///
    /// See [`HttpEventApi::new`].
    pub fn from_config(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        Self::new(config.base_url.clone(), config.request_timeout())
    }

    /// Builds `<base>/v1/event[/<id>]`, percent-encoding the id as one
    /// path segment.
    fn event_url(&self, event_id: Option<&str>) -> Result<Url, ConsoleError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ConsoleError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().extend(["v1", "event"]);
            if let Some(id) = event_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ConsoleError> {
        tracing::debug!(%url, "GET");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            let err = ConsoleError::from_response(status, &body);
            tracing::warn!(%status, error = %err, "backend returned an error");
            return Err(err);
        }
        serde_json::from_str(&body).map_err(|e| ConsoleError::Decode(e.to_string()))
    }
}

impl EventApi for HttpEventApi {
    async fn search(&self, params: &QueryParams) -> Result<SearchResponse, ConsoleError> {
        let mut url = self.event_url(None)?;
        params.append_to(&mut url);
        self.get_json(url).await
    }

    async fn lookup(&self, event_id: &str) -> Result<LookupResponse, ConsoleError> {
        let url = self.event_url(Some(event_id))?;
        self.get_json(url).await
    }
}
