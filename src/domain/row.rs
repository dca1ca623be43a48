//! Row models for the results table.
//!
//! [`RowModel::from_record`] is the pure `EventRecord -> RowModel`
//! transformation; presentation lives in [`crate::render`].

use chrono::FixedOffset;
use serde::Serialize;

use super::event_record::EventRecord;
use super::timestamp::format_event_time;

/// The nine fixed columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// Event id.
    Id,
    /// Topic name.
    Topic,
    /// Datacenter.
    Datacenter,
    /// Tags, comma-joined.
    Tags,
    /// Event time, formatted.
    Time,
    /// Originating host.
    Host,
    /// Target hosts, comma-joined.
    TargetHosts,
    /// User.
    User,
    /// Parent event id.
    ParentId,
}

impl Column {
    /// Every column in display order.
    pub const ALL: [Self; 9] = [
        Self::Id,
        Self::Topic,
        Self::Datacenter,
        Self::Tags,
        Self::Time,
        Self::Host,
        Self::TargetHosts,
        Self::User,
        Self::ParentId,
    ];

    /// Header label.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Id => "Event ID",
            Self::Topic => "Topic",
            Self::Datacenter => "DC",
            Self::Tags => "Tags",
            Self::Time => "Event Time",
            Self::Host => "Host",
            Self::TargetHosts => "Target Hosts",
            Self::User => "User",
            Self::ParentId => "Parent Event ID",
        }
    }
}

/// Display-ready summary row: one string per [`Column`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowModel {
    /// Id used for the detail lookup.
    pub event_id: String,
    /// Cells in [`Column::ALL`] order.
    pub cells: [String; 9],
}

impl RowModel {
    /// Builds the summary row for a record. Absent fields become empty cells.
    #[must_use]
    pub fn from_record(record: &EventRecord, offset: FixedOffset) -> Self {
        Self {
            event_id: record.event_id.clone(),
            cells: [
                record.event_id.clone(),
                record.topic_name.clone(),
                record.dc.clone(),
                record.tag_set.join(", "),
                format_event_time(record.event_time, offset),
                record.host.clone(),
                record.target_host_set.join(", "),
                record.user.clone(),
                record.parent_event_id.clone(),
            ],
        }
    }

    /// Cell for a column.
    #[must_use]
    pub fn cell(&self, column: Column) -> &str {
        Column::ALL
            .iter()
            .zip(self.cells.iter())
            .find(|(c, _)| **c == column)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }
}

/// Lifecycle of a row's detail container.
///
/// ```text
/// Unfetched --select--> Fetching --ok--> Fetched { expanded: true }
///                          |
///                          +--err--> Unfetched
/// Fetched { expanded } --select--> Fetched { expanded: !expanded }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DetailState {
    /// Never loaded; container empty and hidden.
    #[default]
    Unfetched,
    /// Lookup in flight; container still hidden.
    Fetching,
    /// Payload cached; only visibility changes from here on.
    Fetched {
        /// Pretty-printed `data` payload.
        payload: String,
        /// Whether the container is shown.
        expanded: bool,
    },
}

impl DetailState {
    /// Whether the detail container is visible.
    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        matches!(self, Self::Fetched { expanded: true, .. })
    }

    /// Cached payload, if loaded.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Fetched { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

/// A summary row paired with its detail container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRow {
    /// Summary cells.
    pub summary: RowModel,
    /// Detail container state; always starts hidden.
    pub detail: DetailState,
}

impl RenderedRow {
    /// New row with a hidden, empty detail container.
    #[must_use]
    pub fn new(summary: RowModel) -> Self {
        Self {
            summary,
            detail: DetailState::Unfetched,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Offset, Utc};

    use super::*;

    #[test]
    fn list_fields_are_comma_joined() {
        let record = EventRecord {
            event_id: "ev-1".into(),
            tag_set: vec!["a".into(), "b".into()],
            target_host_set: vec!["web-1".into()],
            event_time: 1_700_000_000,
            ..EventRecord::default()
        };
        let row = RowModel::from_record(&record, Utc.fix());
        assert_eq!(row.cell(Column::Tags), "a, b");
        assert_eq!(row.cell(Column::TargetHosts), "web-1");
        assert_eq!(row.cell(Column::Time), "Tue Nov 14 2023 22:13:20 GMT+0000");
    }

    #[test]
    fn missing_fields_still_produce_nine_cells() {
        let row = RowModel::from_record(&EventRecord::default(), Utc.fix());
        assert_eq!(row.cells.len(), Column::ALL.len());
        assert!(row.cells.iter().all(String::is_empty));
    }

    #[test]
    fn only_fetched_expanded_is_visible() {
        assert!(!DetailState::Unfetched.is_expanded());
        assert!(!DetailState::Fetching.is_expanded());
        let hidden = DetailState::Fetched {
            payload: "{}".into(),
            expanded: false,
        };
        assert!(!hidden.is_expanded());
        assert_eq!(hidden.payload(), Some("{}"));
    }

    #[test]
    fn new_rows_start_collapsed() {
        let row = RenderedRow::new(RowModel::from_record(&EventRecord::default(), Utc.fix()));
        assert_eq!(row.detail, DetailState::Unfetched);
    }
}
