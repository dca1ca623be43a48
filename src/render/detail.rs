//! Detail payload formatting.

use serde::Serialize;

/// Pretty-prints a `data` payload with 4-space indentation.
///
/// An absent payload renders as `null`.
#[must_use]
pub fn pretty_payload(data: Option<&serde_json::Value>) -> String {
    let value = data.unwrap_or(&serde_json::Value::Null);
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if value.serialize(&mut ser).is_err() {
        return value.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_payload_uses_four_spaces() {
        let data = json!({"sha": "abc", "files": ["a.rs"]});
        assert_eq!(
            pretty_payload(Some(&data)),
            "{\n    \"files\": [\n        \"a.rs\"\n    ],\n    \"sha\": \"abc\"\n}"
        );
    }

    #[test]
    fn missing_payload_is_null() {
        assert_eq!(pretty_payload(None), "null");
    }

    #[test]
    fn output_is_stable() {
        let data = json!({"b": 1, "a": {"d": 2, "c": 3}});
        assert_eq!(pretty_payload(Some(&data)), pretty_payload(Some(&data)));
    }
}
