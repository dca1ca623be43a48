//! Query session: the state one console page owns.
//!
//! A [`QuerySession`] holds the compiled parameters, the results table,
//! the refresh flags and an in-flight counter. Everything is explicit
//! state on the session, so independent sessions never interfere.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{FixedOffset, Utc};
use reqwest::Url;
use tokio::sync::RwLock;

use super::compiler::QueryCompiler;
use super::dispatcher::{SearchRequest, dispatch};
use crate::client::EventApi;
use crate::config::ConsoleConfig;
use crate::domain::{
    ConsoleEvent, DetailState, EventBus, QueryParams, SearchForm, SearchMode, SessionId,
};
use crate::error::ConsoleError;
use crate::render::{ResultTable, pretty_payload};

/// Per-session settings.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// `limit` appended to list searches.
    pub search_limit: u32,
    /// Offset for picker input and time display.
    pub utc_offset: FixedOffset,
    /// Initial state of the auto-refresh toggle.
    pub auto_refresh: bool,
}

impl From<&ConsoleConfig> for SessionSettings {
    fn from(config: &ConsoleConfig) -> Self {
        Self {
            search_limit: config.search_limit,
            utc_offset: config.utc_offset(),
            auto_refresh: config.auto_refresh,
        }
    }
}

/// Result of a successful search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Request shape that was used.
    pub mode: SearchMode,
    /// Rows now in the table.
    pub rows: usize,
    /// Table generation after the replacement.
    pub generation: u64,
}

/// What a refresh tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The refresh toggle is off.
    Disabled,
    /// The last search failed; waiting for a successful one.
    Paused,
    /// Another search is still in flight.
    Busy,
    /// A search ran.
    Ran(Result<SearchOutcome, ConsoleError>),
}

/// What selecting a row did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    /// First expansion: the payload was fetched and shown.
    Loaded,
    /// Cached payload shown or hidden without a request.
    Toggled {
        /// Visibility after the toggle.
        expanded: bool,
    },
    /// A fetch for this row is already in flight; nothing was done.
    Pending,
    /// The table was replaced while fetching; the payload was dropped.
    Discarded,
}

/// Decrements the in-flight counter when a search finishes.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A row in one specific table: `(generation, index)`.
type RowKey = (u64, usize);

/// Registers a live detail fetch for one row.
///
/// Dropping it unregisters the fetch. If the row is still `Fetching` it
/// is put back to `Unfetched`, so a fetch abandoned mid-request (timeout,
/// `select!`, aborted task) never leaves the row stuck. When the table
/// lock is busy at that moment the row keeps its `Fetching` marker, but
/// the next selection sees no live fetch and fetches again.
struct PendingDetail<'a> {
    table: &'a RwLock<ResultTable>,
    live: &'a Mutex<HashSet<RowKey>>,
    key: RowKey,
}

impl<'a> PendingDetail<'a> {
    fn register(table: &'a RwLock<ResultTable>, live: &'a Mutex<HashSet<RowKey>>, key: RowKey) -> Self {
        live.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key);
        Self { table, live, key }
    }
}

impl Drop for PendingDetail<'_> {
    fn drop(&mut self) {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
        let (generation, index) = self.key;
        if let Ok(mut table) = self.table.try_write()
            && table.generation() == generation
            && let Some(row) = table.row_at_mut(index)
            && row.detail == DetailState::Fetching
        {
            row.detail = DetailState::Unfetched;
        }
    }
}

/// One console page's worth of query state.
#[derive(Debug)]
pub struct QuerySession<A> {
    id: SessionId,
    api: A,
    settings: SessionSettings,
    compiler: QueryCompiler,
    params: RwLock<QueryParams>,
    table: RwLock<ResultTable>,
    last_request_succeeded: AtomicBool,
    auto_refresh: AtomicBool,
    searches_in_flight: AtomicUsize,
    details_in_flight: Mutex<HashSet<RowKey>>,
    event_bus: EventBus,
}

impl<A: EventApi> QuerySession<A> {
    /// Creates a session with an empty table and no compiled parameters.
    #[must_use]
    pub fn new(api: A, settings: SessionSettings, event_bus: EventBus) -> Self {
        Self {
            id: SessionId::new(),
            api,
            compiler: QueryCompiler::new(settings.utc_offset),
            settings,
            params: RwLock::new(QueryParams::new()),
            table: RwLock::new(ResultTable::new()),
            last_request_succeeded: AtomicBool::new(true),
            auto_refresh: AtomicBool::new(settings.auto_refresh),
            searches_in_flight: AtomicUsize::new(0),
            details_in_flight: Mutex::new(HashSet::new()),
            event_bus,
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Bus the session publishes notifications on.
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Backend client.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Session settings.
    #[must_use]
    pub const fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Parameters captured at the last submit (never includes `limit`).
    pub async fn params(&self) -> QueryParams {
        self.params.read().await.clone()
    }

    /// Snapshot of the current table.
    pub async fn table(&self) -> ResultTable {
        self.table.read().await.clone()
    }

    /// Whether the most recent search succeeded.
    #[must_use]
    pub fn last_request_succeeded(&self) -> bool {
        self.last_request_succeeded.load(Ordering::SeqCst)
    }

    /// Whether the refresh toggle is on.
    #[must_use]
    pub fn auto_refresh_enabled(&self) -> bool {
        self.auto_refresh.load(Ordering::SeqCst)
    }

    /// Flips the refresh toggle.
    pub fn set_auto_refresh(&self, enabled: bool) {
        self.auto_refresh.store(enabled, Ordering::SeqCst);
        tracing::info!(session_id = %self.id, enabled, "auto refresh toggled");
    }

    /// Number of searches currently awaiting a response.
    #[must_use]
    pub fn searches_in_flight(&self) -> usize {
        self.searches_in_flight.load(Ordering::SeqCst)
    }

    /// Compiles `form`, stores the parameters and runs the search.
    ///
    /// # Errors
    ///
    /// Returns the compile or request error. Either way the alert is
    /// published and the success flag cleared; the table is untouched.
    pub async fn submit(&self, form: &SearchForm) -> Result<SearchOutcome, ConsoleError> {
        match self.compiler.compile_form(form) {
            Ok(params) => {
                *self.params.write().await = params;
                self.search().await
            }
            Err(err) => {
                self.search_failed(&err);
                Err(err)
            }
        }
    }

    /// Clears `form` and the stored parameters, then runs the default
    /// list search.
    ///
    /// # Errors
    ///
    /// See [`QuerySession::search`].
    pub async fn reset(&self, form: &mut SearchForm) -> Result<SearchOutcome, ConsoleError> {
        form.clear();
        *self.params.write().await = QueryParams::new();
        self.search().await
    }

    /// Runs the search for the stored parameters and replaces the table.
    ///
    /// # Errors
    ///
    /// Returns the request error after publishing the alert and clearing
    /// the success flag. The table is only replaced by a response that
    /// parsed.
    pub async fn search(&self) -> Result<SearchOutcome, ConsoleError> {
        let _in_flight = InFlight::enter(&self.searches_in_flight);
        let request = SearchRequest::plan(&*self.params.read().await, self.settings.search_limit);
        let mode = request.mode();

        let results = match dispatch(&self.api, &request).await {
            Ok(results) => results,
            Err(err) => {
                self.search_failed(&err);
                return Err(err);
            }
        };

        let generation = self
            .table
            .write()
            .await
            .replace(&results, self.settings.utc_offset);
        self.last_request_succeeded.store(true, Ordering::SeqCst);

        let rows = results.len();
        tracing::info!(session_id = %self.id, ?mode, rows, generation, "table replaced");
        let _ = self.event_bus.publish(ConsoleEvent::TableReplaced {
            session_id: self.id,
            generation,
            mode,
            rows,
            timestamp: Utc::now(),
        });
        Ok(SearchOutcome {
            mode,
            rows,
            generation,
        })
    }

    /// One refresh tick: searches again only if the toggle is on, the
    /// last search succeeded and nothing is in flight.
    pub async fn poll(&self) -> PollOutcome {
        if !self.auto_refresh_enabled() {
            return PollOutcome::Disabled;
        }
        if !self.last_request_succeeded() {
            return PollOutcome::Paused;
        }
        if self.searches_in_flight() > 0 {
            return PollOutcome::Busy;
        }
        PollOutcome::Ran(self.search().await)
    }

    /// Link that reproduces the current query: `page_url`'s origin plus
    /// the stored parameters (no `limit`).
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::InvalidUrl`] if `page_url` does not parse
    /// or has no origin.
    pub async fn shareable_link(&self, page_url: &str) -> Result<String, ConsoleError> {
        let url = Url::parse(page_url).map_err(|e| ConsoleError::InvalidUrl(format!("{page_url}: {e}")))?;
        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(ConsoleError::InvalidUrl(page_url.to_string()));
        }
        let params = self.params.read().await.without_limit();
        Ok(format!(
            "{}?{}",
            origin.ascii_serialization(),
            params.to_query_string()
        ))
    }

    /// Selects the summary row for `event_id` (the first one, if the
    /// result set repeats an id).
    ///
    /// The first selection fetches the record and shows its pretty-printed
    /// payload; later selections only toggle visibility. At most one fetch
    /// is in flight per row. A fetch that completes after the table was
    /// replaced is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::RowNotFound`] if no row has this id, or the
    /// fetch error after publishing the alert; the row is left unfetched
    /// so the next selection retries.
    pub async fn toggle_detail(&self, event_id: &str) -> Result<DetailOutcome, ConsoleError> {
        self.select_row(|table| table.position(event_id), event_id)
            .await
    }

    /// Selects the summary row at display position `index`.
    ///
    /// Same behaviour as [`QuerySession::toggle_detail`]; rows sharing an
    /// event id are told apart by position.
    ///
    /// # Errors
    ///
    /// See [`QuerySession::toggle_detail`].
    pub async fn toggle_row(&self, index: usize) -> Result<DetailOutcome, ConsoleError> {
        self.select_row(|table| (index < table.len()).then_some(index), &format!("#{index}"))
            .await
    }

    async fn select_row(
        &self,
        resolve: impl FnOnce(&ResultTable) -> Option<usize>,
        label: &str,
    ) -> Result<DetailOutcome, ConsoleError> {
        let (pending, key, event_id) = {
            let mut table = self.table.write().await;
            let generation = table.generation();
            let index = resolve(&table).ok_or_else(|| ConsoleError::RowNotFound(label.to_string()))?;
            let fetch_live = self.detail_in_flight((generation, index));
            let row = table
                .row_at_mut(index)
                .ok_or_else(|| ConsoleError::RowNotFound(label.to_string()))?;
            let event_id = row.summary.event_id.clone();
            match &mut row.detail {
                DetailState::Fetched { expanded, .. } => {
                    *expanded = !*expanded;
                    let expanded = *expanded;
                    tracing::debug!(session_id = %self.id, %event_id, index, expanded, "detail toggled");
                    let _ = self.event_bus.publish(ConsoleEvent::DetailToggled {
                        session_id: self.id,
                        event_id,
                        expanded,
                        timestamp: Utc::now(),
                    });
                    return Ok(DetailOutcome::Toggled { expanded });
                }
                DetailState::Fetching if fetch_live => return Ok(DetailOutcome::Pending),
                DetailState::Fetching => {
                    tracing::debug!(session_id = %self.id, %event_id, index, "previous detail fetch was abandoned; retrying");
                }
                DetailState::Unfetched => {}
            }
            row.detail = DetailState::Fetching;
            let key = (generation, index);
            let pending = PendingDetail::register(&self.table, &self.details_in_flight, key);
            (pending, key, event_id)
        };

        let fetched = match self.api.lookup(&event_id).await {
            Ok(resp) => resp
                .result
                .ok_or_else(|| ConsoleError::EventNotFound(event_id.clone())),
            Err(err) => Err(err),
        };

        let (generation, index) = key;
        let mut table = self.table.write().await;
        let row = if table.generation() == generation {
            table.row_at_mut(index)
        } else {
            None
        };

        let outcome = match (fetched, row) {
            (Ok(record), Some(row)) => {
                row.detail = DetailState::Fetched {
                    payload: pretty_payload(record.data.as_ref()),
                    expanded: true,
                };
                tracing::info!(session_id = %self.id, %event_id, index, "detail loaded");
                let _ = self.event_bus.publish(ConsoleEvent::DetailLoaded {
                    session_id: self.id,
                    event_id,
                    timestamp: Utc::now(),
                });
                Ok(DetailOutcome::Loaded)
            }
            (Ok(_), None) => {
                tracing::debug!(session_id = %self.id, %event_id, generation, "table replaced during detail fetch; dropping payload");
                Ok(DetailOutcome::Discarded)
            }
            (Err(err), row) => {
                if let Some(row) = row {
                    row.detail = DetailState::Unfetched;
                }
                tracing::warn!(session_id = %self.id, %event_id, error = %err, "detail load failed");
                let _ = self.event_bus.publish(ConsoleEvent::DetailFailed {
                    session_id: self.id,
                    event_id,
                    message: err.detail_alert(),
                    timestamp: Utc::now(),
                });
                Err(err)
            }
        };
        drop(table);
        drop(pending);
        outcome
    }

    fn detail_in_flight(&self, key: RowKey) -> bool {
        self.details_in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&key)
    }

    fn search_failed(&self, err: &ConsoleError) {
        self.last_request_succeeded.store(false, Ordering::SeqCst);
        tracing::warn!(session_id = %self.id, error = %err, "search failed");
        let _ = self.event_bus.publish(ConsoleEvent::SearchFailed {
            session_id: self.id,
            message: err.search_alert(),
            timestamp: Utc::now(),
        });
    }
}
