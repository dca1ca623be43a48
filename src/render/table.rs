//! The results table model.

use chrono::FixedOffset;
use serde::Serialize;

use crate::domain::{RenderedRow, ResultSet, RowModel};

/// Rows currently on screen plus a generation counter.
///
/// The generation is bumped on every [`ResultTable::replace`]; writers
/// that captured an older generation must not touch the new rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    generation: u64,
    rows: Vec<RenderedRow>,
}

impl ResultTable {
    /// Creates an empty table at generation 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every row with the records of `results`, all collapsed
    /// and unfetched. Returns the new generation.
    pub fn replace(&mut self, results: &ResultSet, offset: FixedOffset) -> u64 {
        self.rows = results
            .records()
            .iter()
            .map(|record| RenderedRow::new(RowModel::from_record(record, offset)))
            .collect();
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Current generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Rows in display order.
    #[must_use]
    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    /// Number of event rows (each renders as a summary/detail pair).
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row with the given event id.
    #[must_use]
    pub fn row(&self, event_id: &str) -> Option<&RenderedRow> {
        self.rows.iter().find(|r| r.summary.event_id == event_id)
    }

    /// Mutable access to the first row with the given event id.
    pub fn row_mut(&mut self, event_id: &str) -> Option<&mut RenderedRow> {
        self.rows.iter_mut().find(|r| r.summary.event_id == event_id)
    }

    /// Display position of the first row with the given event id.
    ///
    /// Ids are not required to be unique within a result set; later rows
    /// sharing an id are reachable through [`ResultTable::row_at_mut`].
    #[must_use]
    pub fn position(&self, event_id: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.summary.event_id == event_id)
    }

    /// Mutable access to the row at display position `index`.
    pub fn row_at_mut(&mut self, index: usize) -> Option<&mut RenderedRow> {
        self.rows.get_mut(index)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{Offset, Utc};

    use super::*;
    use crate::domain::{DetailState, EventRecord};

    fn record(id: &str) -> EventRecord {
        EventRecord {
            event_id: id.to_string(),
            topic_name: "deploy".to_string(),
            ..EventRecord::default()
        }
    }

    #[test]
    fn replace_is_idempotent_on_rows() {
        let results = ResultSet::List(vec![record("a"), record("b")]);
        let mut once = ResultTable::new();
        once.replace(&results, Utc.fix());

        let mut twice = ResultTable::new();
        twice.replace(&results, Utc.fix());
        twice.replace(&results, Utc.fix());

        assert_eq!(once.rows(), twice.rows());
        assert_eq!(twice.generation(), 2);
    }

    #[test]
    fn replace_discards_detail_state() {
        let results = ResultSet::List(vec![record("a")]);
        let mut table = ResultTable::new();
        table.replace(&results, Utc.fix());
        let Some(row) = table.row_mut("a") else {
            panic!("row a exists");
        };
        row.detail = DetailState::Fetched {
            payload: "{}".into(),
            expanded: true,
        };

        table.replace(&results, Utc.fix());
        let Some(row) = table.row("a") else {
            panic!("row a exists");
        };
        assert_eq!(row.detail, DetailState::Unfetched);
    }

    #[test]
    fn empty_results_clear_the_table() {
        let mut table = ResultTable::new();
        table.replace(&ResultSet::List(vec![record("a")]), Utc.fix());
        table.replace(&ResultSet::List(Vec::new()), Utc.fix());
        assert!(table.is_empty());

        table.replace(&ResultSet::Single(None), Utc.fix());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn duplicate_ids_are_addressed_by_position() {
        let mut table = ResultTable::new();
        table.replace(
            &ResultSet::List(vec![record("a"), record("b"), record("a")]),
            Utc.fix(),
        );
        assert_eq!(table.position("a"), Some(0));
        assert_eq!(table.position("b"), Some(1));
        assert_eq!(table.position("zzz"), None);

        let Some(row) = table.row_at_mut(2) else {
            panic!("third row exists");
        };
        assert_eq!(row.summary.event_id, "a");
        assert!(table.row_at_mut(3).is_none());
    }
}
