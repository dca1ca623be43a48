//! Background refresh loop.
//!
//! Re-runs the session's stored search on a fixed period while the
//! refresh toggle is on and the previous search succeeded.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::session::{PollOutcome, QuerySession};
use crate::client::EventApi;

/// Counters collected over the loop's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    /// Ticks that elapsed.
    pub ticks: u64,
    /// Ticks that issued a search.
    pub searches: u64,
    /// Searches that failed.
    pub failures: u64,
    /// Ticks skipped because the toggle was off, the last search had
    /// failed, or a search was already in flight.
    pub skipped: u64,
}

/// Spawns refresh loops.
#[derive(Debug)]
pub struct RefreshLoop;

impl RefreshLoop {
    /// Starts a task that polls `session` every `period`.
    ///
    /// The first tick fires one full period after the call.
    #[must_use]
    pub fn spawn<A>(session: Arc<QuerySession<A>>, period: Duration) -> RefreshHandle
    where
        A: EventApi + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut stats = RefreshStats::default();
            tracing::info!(session_id = %session.id(), period = ?period, "refresh loop started");
            loop {
                tokio::select! {
                    () = tokio::time::sleep(period) => {}
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                stats.ticks += 1;
                match session.poll().await {
                    PollOutcome::Ran(Ok(outcome)) => {
                        stats.searches += 1;
                        tracing::debug!(rows = outcome.rows, generation = outcome.generation, "refreshed");
                    }
                    PollOutcome::Ran(Err(_)) => {
                        stats.searches += 1;
                        stats.failures += 1;
                    }
                    PollOutcome::Disabled | PollOutcome::Paused | PollOutcome::Busy => {
                        stats.skipped += 1;
                    }
                }
            }
            tracing::info!(session_id = %session.id(), ticks = stats.ticks, searches = stats.searches, "refresh loop stopped");
            stats
        });
        RefreshHandle { shutdown_tx, task }
    }
}

/// Handle to a running refresh loop.
#[derive(Debug)]
pub struct RefreshHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<RefreshStats>,
}

impl RefreshHandle {
    /// Stops the loop and waits for it to exit.
    ///
    /// A search already in flight is allowed to finish first.
    pub async fn shutdown(self) -> RefreshStats {
        let _ = self.shutdown_tx.send(true);
        match self.task.await {
            Ok(stats) => stats,
            Err(err) => {
                tracing::error!(error = %err, "refresh loop task failed");
                RefreshStats::default()
            }
        }
    }
}
