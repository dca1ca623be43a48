//! Plain-text table presentation for terminals.

use std::fmt::Write as _;

use super::ResultTable;
use crate::domain::{Column, RenderedRow};

const GAP: &str = "  ";

/// Renders the table as aligned text.
///
/// Every row prints its summary line; expanded detail containers print
/// their payload indented underneath. Collapsed ones print nothing.
#[must_use]
pub fn render_table(table: &ResultTable) -> String {
    let widths = column_widths(table.rows());
    let mut out = String::new();

    let header: Vec<&str> = Column::ALL.iter().map(|c| c.title()).collect();
    push_line(&mut out, header.as_slice(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.as_slice(), &widths);

    if table.is_empty() {
        out.push_str("(no events)\n");
        return out;
    }

    for row in table.rows() {
        push_line(&mut out, row.summary.cells.as_slice(), &widths);
        if let Some(payload) = row.detail.payload()
            && row.detail.is_expanded()
        {
            for line in payload.lines() {
                let _ = writeln!(out, "    {line}");
            }
        }
    }
    out
}

fn column_widths(rows: &[RenderedRow]) -> Vec<usize> {
    Column::ALL
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .filter_map(|r| r.summary.cells.get(i))
                .map(|cell| cell.chars().count())
                .fold(column.title().chars().count(), usize::max)
        })
        .collect()
}

fn push_line<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell.as_ref()))
        .collect::<Vec<_>>()
        .join(GAP);
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{Offset, Utc};

    use super::*;
    use crate::domain::{DetailState, EventRecord, ResultSet};

    fn table_with(ids: &[&str]) -> ResultTable {
        let records = ids
            .iter()
            .map(|id| EventRecord {
                event_id: (*id).to_string(),
                host: "web-1".to_string(),
                ..EventRecord::default()
            })
            .collect();
        let mut table = ResultTable::new();
        table.replace(&ResultSet::List(records), Utc.fix());
        table
    }

    #[test]
    fn empty_table_has_header_and_marker() {
        let text = render_table(&ResultTable::new());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.first().is_some_and(|l| l.starts_with("Event ID")));
        assert_eq!(lines.last(), Some(&"(no events)"));
    }

    #[test]
    fn collapsed_details_are_hidden() {
        let mut table = table_with(&["ev-1"]);
        let Some(row) = table.row_mut("ev-1") else {
            panic!("row exists");
        };
        row.detail = DetailState::Fetched {
            payload: "{\n    \"k\": 1\n}".into(),
            expanded: false,
        };
        assert!(!render_table(&table).contains("\"k\""));

        let Some(row) = table.row_mut("ev-1") else {
            panic!("row exists");
        };
        row.detail = DetailState::Fetched {
            payload: "{\n    \"k\": 1\n}".into(),
            expanded: true,
        };
        assert!(render_table(&table).contains("        \"k\": 1"));
    }

    #[test]
    fn columns_are_aligned() {
        let text = render_table(&table_with(&["a", "a-much-longer-id"]));
        let hosts: Vec<_> = text
            .lines()
            .skip(2)
            .filter_map(|l| l.find("web-1"))
            .collect();
        assert_eq!(hosts.len(), 2);
        assert!(hosts.windows(2).all(|w| w.first() == w.last()));
    }
}
