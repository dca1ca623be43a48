//! Fan-out of session notifications to front ends.
//!
//! A session publishes a [`ConsoleEvent`] whenever its table, a row detail
//! or its alert state changes. The CLI printer and tests subscribe.

use tokio::sync::broadcast;

use super::ConsoleEvent;

/// Cloneable handle that sessions publish [`ConsoleEvent`]s through.
///
/// Slow subscribers see `RecvError::Lagged` and skip ahead.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ConsoleEvent>,
}

impl EventBus {
    /// Buffers up to `capacity` undelivered notifications (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Sends `event` to current subscribers and returns how many there were;
    /// zero means nobody is listening.
    pub fn publish(&self, event: ConsoleEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribes from now on; earlier notifications are not replayed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.sender.subscribe()
    }

    /// Live subscriber count.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
