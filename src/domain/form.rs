//! Search form model.
//!
//! [`SearchForm`] holds the raw field values as the user typed them.
//! [`SearchForm::entries`] serialises it into [`FormEntry`] pairs in page
//! order, the input the query compiler works on.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use super::timestamp::format_picker_time;

/// Multi-select field name; each selection is a separate entry.
pub const TOPICS_FIELD: &str = "selected_topics[]";
/// Free-text payload filter.
pub const DATA_FIELD: &str = "data";
/// Start of the event time window (picker string).
pub const START_TIME_FIELD: &str = "startEventTime";
/// End of the event time window (picker string).
pub const END_TIME_FIELD: &str = "endEventTime";
/// Suffix shared by the boolean AND-operator checkboxes.
pub const OPERATOR_SUFFIX: &str = "operator";

/// One serialised form control: its name and raw value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormEntry {
    /// Control name.
    pub name: String,
    /// Raw value as entered.
    pub value: String,
}

impl FormEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// How a field's raw value turns into query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Checkbox; emits `name=true` when checked.
    BooleanFlag,
    /// Passed through as a single parameter.
    FreeText,
    /// Picker string converted to unix seconds under the given key.
    Timestamp(&'static str),
    /// One parameter per selection under the given key.
    MultiSelect(&'static str),
    /// Comma-separated tokens, one parameter each.
    CommaList,
}

impl FieldKind {
    /// Classifies a form control by name.
    #[must_use]
    pub fn classify(name: &str) -> Self {
        if name.ends_with(OPERATOR_SUFFIX) {
            return Self::BooleanFlag;
        }
        match name {
            TOPICS_FIELD => Self::MultiSelect("topic_name"),
            DATA_FIELD => Self::FreeText,
            START_TIME_FIELD => Self::Timestamp("start_event_time"),
            END_TIME_FIELD => Self::Timestamp("end_event_time"),
            _ => Self::CommaList,
        }
    }
}

/// Raw values of every control on the search page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchForm {
    /// Single event id; forces a point lookup when set.
    pub event_id: String,
    /// Comma-separated parent ids.
    pub parent_event_id: String,
    /// Comma-separated datacenters.
    pub dc: String,
    /// Topics picked in the multi-select.
    pub topics: Vec<String>,
    /// Require every tag instead of any.
    pub tag_and_operator: bool,
    /// Comma-separated tags.
    pub tag_set: String,
    /// Comma-separated tags to exclude.
    pub exclude_tag_set: String,
    /// Comma-separated hosts.
    pub host: String,
    /// Require every target host instead of any.
    pub target_host_and_operator: bool,
    /// Comma-separated target hosts.
    pub target_host_set: String,
    /// Comma-separated users.
    pub user: String,
    /// Free-text payload filter.
    pub data: String,
    /// Start of the time window, picker format.
    pub start_event_time: String,
    /// End of the time window, picker format.
    pub end_event_time: String,
}

impl SearchForm {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Form with the initial page-load window: `now - 5000s` to `now + 60s`.
    #[must_use]
    pub fn with_default_window(now: i64, offset: FixedOffset) -> Self {
        Self {
            start_event_time: format_picker_time(now.saturating_sub(5000), offset),
            end_event_time: format_picker_time(now.saturating_add(60), offset),
            ..Self::default()
        }
    }

    /// Clears every field, including checkboxes and topic selections.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Serialises the form in page order.
    ///
    /// Unchecked boxes produce no entry; each selected topic produces
    /// one. Text fields are emitted even when empty.
    #[must_use]
    pub fn entries(&self) -> Vec<FormEntry> {
        let mut entries = vec![
            FormEntry::new("event_id", &self.event_id),
            FormEntry::new("parent_event_id", &self.parent_event_id),
            FormEntry::new("dc", &self.dc),
        ];
        entries.extend(
            self.topics
                .iter()
                .map(|topic| FormEntry::new(TOPICS_FIELD, topic)),
        );
        if self.tag_and_operator {
            entries.push(FormEntry::new("tag_and_operator", "on"));
        }
        entries.push(FormEntry::new("tag_set", &self.tag_set));
        entries.push(FormEntry::new("exclude_tag_set", &self.exclude_tag_set));
        entries.push(FormEntry::new("host", &self.host));
        if self.target_host_and_operator {
            entries.push(FormEntry::new("target_host_and_operator", "on"));
        }
        entries.extend([
            FormEntry::new("target_host_set", &self.target_host_set),
            FormEntry::new("user", &self.user),
            FormEntry::new(DATA_FIELD, &self.data),
            FormEntry::new(START_TIME_FIELD, &self.start_event_time),
            FormEntry::new(END_TIME_FIELD, &self.end_event_time),
        ]);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_known_fields() {
        assert_eq!(FieldKind::classify("tag_and_operator"), FieldKind::BooleanFlag);
        assert_eq!(
            FieldKind::classify("target_host_and_operator"),
            FieldKind::BooleanFlag
        );
        assert_eq!(
            FieldKind::classify(TOPICS_FIELD),
            FieldKind::MultiSelect("topic_name")
        );
        assert_eq!(FieldKind::classify("data"), FieldKind::FreeText);
        assert_eq!(
            FieldKind::classify("startEventTime"),
            FieldKind::Timestamp("start_event_time")
        );
        assert_eq!(FieldKind::classify("host"), FieldKind::CommaList);
        assert_eq!(FieldKind::classify("event_id"), FieldKind::CommaList);
    }

    #[test]
    fn unchecked_boxes_are_absent() {
        let form = SearchForm::new();
        assert!(form.entries().iter().all(|e| !e.name.ends_with("operator")));

        let checked = SearchForm {
            tag_and_operator: true,
            ..SearchForm::new()
        };
        let names: Vec<_> = checked.entries().into_iter().map(|e| e.name).collect();
        assert!(names.contains(&"tag_and_operator".to_string()));
        assert!(!names.contains(&"target_host_and_operator".to_string()));
    }

    #[test]
    fn each_topic_is_its_own_entry() {
        let form = SearchForm {
            topics: vec!["deploy".into(), "alert".into()],
            ..SearchForm::new()
        };
        let topics: Vec<_> = form
            .entries()
            .into_iter()
            .filter(|e| e.name == TOPICS_FIELD)
            .map(|e| e.value)
            .collect();
        assert_eq!(topics, vec!["deploy", "alert"]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut form = SearchForm {
            event_id: "x".into(),
            topics: vec!["deploy".into()],
            tag_and_operator: true,
            target_host_and_operator: true,
            data: "payload".into(),
            ..SearchForm::new()
        };
        form.clear();
        assert_eq!(form, SearchForm::default());
    }

    #[test]
    fn default_window_spans_page_load() {
        use chrono::Offset;

        let utc = chrono::Utc.fix();
        let form = SearchForm::with_default_window(1_700_000_000, utc);
        assert_eq!(form.start_event_time, "11/14/2023 08:50 PM");
        assert_eq!(form.end_event_time, "11/14/2023 10:14 PM");
    }
}
