//! In-memory [`EventApi`] for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, Notify};

use super::EventApi;
use crate::domain::{EventRecord, LookupResponse, QueryParams, SearchResponse};
use crate::error::ConsoleError;

/// A request the fake received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Recorded {
    Search(QueryParams),
    Lookup(String),
}

/// Serves a fixed set of records and records every call.
#[derive(Debug, Default)]
pub(crate) struct FakeEventApi {
    records: Mutex<Vec<EventRecord>>,
    search_error: Mutex<Option<ConsoleError>>,
    lookup_error: Mutex<Option<ConsoleError>>,
    search_gate: Mutex<Option<Arc<Notify>>>,
    lookup_gate: Mutex<Option<Arc<Notify>>>,
    requests: Mutex<Vec<Recorded>>,
    searches: AtomicUsize,
    lookups: AtomicUsize,
}

impl FakeEventApi {
    pub(crate) fn with_records(records: Vec<EventRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub(crate) async fn set_records(&self, records: Vec<EventRecord>) {
        *self.records.lock().await = records;
    }

    pub(crate) async fn fail_searches(&self, err: Option<ConsoleError>) {
        *self.search_error.lock().await = err;
    }

    pub(crate) async fn fail_lookups(&self, err: Option<ConsoleError>) {
        *self.lookup_error.lock().await = err;
    }

    /// Makes searches wait until the returned handle is notified.
    pub(crate) async fn gate_searches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.search_gate.lock().await = Some(Arc::clone(&gate));
        gate
    }

    /// Makes lookups wait until the returned handle is notified.
    pub(crate) async fn gate_lookups(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.lookup_gate.lock().await = Some(Arc::clone(&gate));
        gate
    }

    pub(crate) fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub(crate) fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub(crate) async fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().await.clone()
    }
}

impl EventApi for FakeEventApi {
    async fn search(&self, params: &QueryParams) -> Result<SearchResponse, ConsoleError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .await
            .push(Recorded::Search(params.clone()));
        let gate = self.search_gate.lock().await.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(err) = self.search_error.lock().await.clone() {
            return Err(err);
        }
        Ok(SearchResponse {
            results: self.records.lock().await.clone(),
        })
    }

    async fn lookup(&self, event_id: &str) -> Result<LookupResponse, ConsoleError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .await
            .push(Recorded::Lookup(event_id.to_string()));
        let gate = self.lookup_gate.lock().await.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(err) = self.lookup_error.lock().await.clone() {
            return Err(err);
        }
        let result = self
            .records
            .lock()
            .await
            .iter()
            .find(|r| r.event_id == event_id)
            .cloned();
        Ok(LookupResponse { result })
    }
}
