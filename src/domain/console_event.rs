//! User-visible notifications emitted by a query session.
//!
//! Every table replacement, alert and detail change is published as a
//! [`ConsoleEvent`] through the [`super::EventBus`]; front ends subscribe
//! and render them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{SearchMode, SessionId};

/// Notification emitted after a session mutates visible state.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ConsoleEvent {
    /// The results table was replaced by a successful search.
    TableReplaced {
        /// Originating session.
        session_id: SessionId,
        /// Table generation after the replacement.
        generation: u64,
        /// Request shape that produced the rows.
        mode: SearchMode,
        /// Number of rendered rows.
        rows: usize,
        /// Render timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A search failed; the table is untouched.
    SearchFailed {
        /// Originating session.
        session_id: SessionId,
        /// Alert text, including the backend message when available.
        message: String,
        /// Failure timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A row's detail payload was loaded and shown.
    DetailLoaded {
        /// Originating session.
        session_id: SessionId,
        /// Row whose detail was loaded.
        event_id: String,
        /// Load timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A cached detail container was shown or hidden.
    DetailToggled {
        /// Originating session.
        session_id: SessionId,
        /// Row that was toggled.
        event_id: String,
        /// Visibility after the toggle.
        expanded: bool,
        /// Toggle timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A detail load failed; the row stays unfetched.
    DetailFailed {
        /// Originating session.
        session_id: SessionId,
        /// Row whose detail failed to load.
        event_id: String,
        /// Alert text.
        message: String,
        /// Failure timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl ConsoleEvent {
    /// Returns the session that emitted this event.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        match self {
            Self::TableReplaced { session_id, .. }
            | Self::SearchFailed { session_id, .. }
            | Self::DetailLoaded { session_id, .. }
            | Self::DetailToggled { session_id, .. }
            | Self::DetailFailed { session_id, .. } => *session_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::TableReplaced { .. } => "table_replaced",
            Self::SearchFailed { .. } => "search_failed",
            Self::DetailLoaded { .. } => "detail_loaded",
            Self::DetailToggled { .. } => "detail_toggled",
            Self::DetailFailed { .. } => "detail_failed",
        }
    }

    /// Alert text for failure events.
    #[must_use]
    pub fn alert(&self) -> Option<&str> {
        match self {
            Self::SearchFailed { message, .. } | Self::DetailFailed { message, .. } => {
                Some(message)
            }
            _ => None,
        }
    }
}
