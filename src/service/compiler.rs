//! Query compiler: form entries to an ordered parameter list.

use chrono::FixedOffset;

use crate::domain::form::FieldKind;
use crate::domain::query_param::LIMIT_KEY;
use crate::domain::timestamp::parse_picker_time;
use crate::domain::{FormEntry, QueryParams, SearchForm};
use crate::error::ConsoleError;

/// Turns raw form values into [`QueryParams`].
///
/// Empty fields contribute nothing. Keys are emitted in order of first
/// appearance; a key seen again overwrites its values in place. Topic
/// selections and the two timestamps are appended after the scanned
/// fields, in that order. The result never contains `limit`.
#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler {
    offset: FixedOffset,
}

impl QueryCompiler {
    /// Creates a compiler that reads picker times in `offset`.
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Compiles a whole form.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::InvalidTimestamp`] if a time field holds a
    /// value that cannot be converted.
    pub fn compile_form(&self, form: &SearchForm) -> Result<QueryParams, ConsoleError> {
        self.compile(&form.entries())
    }

    /// Compiles serialised form entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::InvalidTimestamp`] if a time field holds a
    /// value that cannot be converted.
    pub fn compile(&self, entries: &[FormEntry]) -> Result<QueryParams, ConsoleError> {
        let mut groups = Groups::default();
        let mut topics: Vec<String> = Vec::new();
        let mut times: Vec<(&'static str, i64)> = Vec::new();

        for entry in entries
            .iter()
            .filter(|e| !e.value.is_empty() && e.name != LIMIT_KEY)
        {
            match FieldKind::classify(&entry.name) {
                FieldKind::BooleanFlag => groups.set(&entry.name, vec!["true".to_string()]),
                FieldKind::FreeText => groups.set(&entry.name, vec![entry.value.clone()]),
                FieldKind::MultiSelect(_) => topics.push(entry.value.clone()),
                FieldKind::Timestamp(key) => {
                    if entry.value.trim().is_empty() {
                        continue;
                    }
                    let secs = parse_picker_time(&entry.value, self.offset)?;
                    times.retain(|(k, _)| *k != key);
                    times.push((key, secs));
                }
                FieldKind::CommaList => {
                    let tokens = split_list(&entry.value);
                    if !tokens.is_empty() {
                        groups.set(&entry.name, tokens);
                    }
                }
            }
        }

        if !topics.is_empty() {
            groups.set(TOPIC_KEY, topics);
        }
        for key in TIME_KEYS {
            if let Some((_, secs)) = times.iter().find(|(k, _)| *k == key) {
                groups.set(key, vec![secs.to_string()]);
            }
        }

        let params = groups.into_params();
        tracing::debug!(params = %params.to_query_string(), "compiled query");
        Ok(params)
    }
}

const TOPIC_KEY: &str = "topic_name";
const TIME_KEYS: [&str; 2] = ["start_event_time", "end_event_time"];

/// Strips all whitespace and splits on commas, dropping empty tokens.
fn split_list(raw: &str) -> Vec<String> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .split(',')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Insertion-ordered `key -> values` map.
#[derive(Default)]
struct Groups(Vec<(String, Vec<String>)>);

impl Groups {
    fn set(&mut self, key: &str, values: Vec<String>) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = values,
            None => self.0.push((key.to_string(), values)),
        }
    }

    fn into_params(self) -> QueryParams {
        let mut params = QueryParams::new();
        for (key, values) in self.0 {
            for value in values {
                params.push(key.clone(), value);
            }
        }
        params
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{Offset, Utc};

    use super::*;
    use crate::domain::QueryParam;

    fn compiler() -> QueryCompiler {
        QueryCompiler::new(Utc.fix())
    }

    fn compile(form: &SearchForm) -> QueryParams {
        let Ok(params) = compiler().compile_form(form) else {
            panic!("form should compile");
        };
        params
    }

    fn kv(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    fn pairs(params: &QueryParams) -> Vec<(String, String)> {
        params
            .iter()
            .map(|p| (p.key.clone(), p.value.clone()))
            .collect()
    }

    #[test]
    fn empty_form_compiles_to_nothing() {
        assert!(compile(&SearchForm::new()).is_empty());
    }

    #[test]
    fn list_field_is_split_without_empty_tokens() {
        let form = SearchForm {
            host: "a, b ,  c".into(),
            ..SearchForm::new()
        };
        assert_eq!(
            pairs(&compile(&form)),
            vec![
                kv("host", "a"),
                kv("host", "b"),
                kv("host", "c"),
            ]
        );
    }

    #[test]
    fn whitespace_only_and_stray_commas_emit_nothing() {
        let form = SearchForm {
            dc: "   ".into(),
            user: " , ,".into(),
            ..SearchForm::new()
        };
        assert!(compile(&form).is_empty());
    }

    #[test]
    fn operator_flags_emit_true_only_when_checked() {
        let unchecked = compile(&SearchForm {
            tag_set: "x".into(),
            ..SearchForm::new()
        });
        assert_eq!(unchecked.values("tag_and_operator").count(), 0);

        let checked = compile(&SearchForm {
            tag_set: "x".into(),
            tag_and_operator: true,
            target_host_and_operator: true,
            ..SearchForm::new()
        });
        assert_eq!(
            checked.values("tag_and_operator").collect::<Vec<_>>(),
            vec!["true"]
        );
        assert_eq!(
            checked
                .values("target_host_and_operator")
                .collect::<Vec<_>>(),
            vec!["true"]
        );
    }

    #[test]
    fn data_is_passed_through_untouched() {
        let form = SearchForm {
            data: "{\"sha\": \"a, b\"}".into(),
            ..SearchForm::new()
        };
        assert_eq!(
            pairs(&compile(&form)),
            vec![kv("data", "{\"sha\": \"a, b\"}")]
        );
    }

    #[test]
    fn topics_and_times_follow_scanned_fields() {
        let form = SearchForm {
            dc: "sjc1".into(),
            topics: vec!["deploy".into(), "alert".into()],
            user: "alice".into(),
            start_event_time: "11/14/2023 10:13 PM".into(),
            end_event_time: "1700003600".into(),
            ..SearchForm::new()
        };
        assert_eq!(
            pairs(&compile(&form)),
            vec![
                kv("dc", "sjc1"),
                kv("user", "alice"),
                kv("topic_name", "deploy"),
                kv("topic_name", "alert"),
                kv("start_event_time", "1699999980"),
                kv("end_event_time", "1700003600"),
            ]
        );
    }

    #[test]
    fn repeated_key_overwrites_in_place() {
        let entries = vec![
            FormEntry::new("host", "a"),
            FormEntry::new("dc", "sjc1"),
            FormEntry::new("host", "b, c"),
        ];
        let Ok(params) = compiler().compile(&entries) else {
            panic!("entries should compile");
        };
        assert_eq!(
            params.iter().cloned().collect::<Vec<_>>(),
            vec![
                QueryParam::new("host", "b"),
                QueryParam::new("host", "c"),
                QueryParam::new("dc", "sjc1"),
            ]
        );
    }

    #[test]
    fn bad_timestamp_is_an_error() {
        let form = SearchForm {
            start_event_time: "next tuesday".into(),
            ..SearchForm::new()
        };
        assert!(matches!(
            compiler().compile_form(&form),
            Err(ConsoleError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn limit_field_is_ignored() {
        let entries = vec![FormEntry::new("limit", "5"), FormEntry::new("user", "bob")];
        let Ok(params) = compiler().compile(&entries) else {
            panic!("entries should compile");
        };
        assert_eq!(params.values("limit").count(), 0);
        assert_eq!(params.len(), 1);
    }
}
