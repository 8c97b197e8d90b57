//! Turn schemas and example values into escaped JSON body text.
//!
//! The output is meant to sit between the quotes of a JSON string (the `raw`
//! body of a Postman request), so every quote is emitted as `\"` and every
//! formatting newline as the two characters `\n`. Text inside string values
//! is escaped twice: once for the body document, once for the string that
//! carries it.

use oapm_core::model::{FieldKind, SchemaDescriptor};
use serde_json::Value;

use crate::items::EscapedText;

const QUOTE: &str = "\\\"";
const NEW_LINE: &str = "\\n";
const ENTRY_SEPARATOR: &str = ",\\n ";

/// Synthesize a placeholder body from the schema's fields:
/// `{\n \"name\": \"<string>\",\n \"age\": \"<number>\"\n}`.
pub fn schema_to_json(schema: &SchemaDescriptor) -> EscapedText {
    let entries: Vec<String> = schema
        .fields
        .iter()
        .map(|field| {
            format!(
                "{QUOTE}{}{QUOTE}: {QUOTE}<{}>{QUOTE}",
                escape_value_text(&field.name),
                placeholder_type(field.kind)
            )
        })
        .collect();
    EscapedText::from_escaped(frame_object(entries))
}

fn placeholder_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Number => "number",
        FieldKind::Date => "date",
        FieldKind::String | FieldKind::Boolean | FieldKind::Other => "string",
    }
}

/// Serialize an example value.
///
/// Absent or null values give empty text. A string is taken to be JSON text
/// and goes through [`format_json`].
pub fn example_to_json(value: Option<&Value>) -> EscapedText {
    match value {
        None | Some(Value::Null) => EscapedText::empty(),
        Some(Value::String(text)) => format_json(text),
        Some(Value::Object(map)) => EscapedText::from_escaped(object_to_json(map)),
        Some(Value::Array(items)) => EscapedText::from_escaped(array_to_json(items)),
        Some(other) => EscapedText::from_escaped(other.to_string()),
    }
}

/// Parse JSON text and lay it out the way example values are laid out.
/// Malformed text gives empty text.
pub fn format_json(text: &str) -> EscapedText {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => value_to_json(&value)
            .map(EscapedText::from_escaped)
            .unwrap_or_else(EscapedText::empty),
        Err(e) => {
            log::warn!("example is not valid JSON, emitting an empty body: {e}");
            EscapedText::empty()
        }
    }
}

/// Escape free text for embedding in a JSON string: backslashes, quotes and
/// control characters.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Content of a string value inside the body: escaped for the body document,
/// then again for the carrying string.
fn escape_value_text(text: &str) -> String {
    escape_text(&escape_text(text))
}

fn frame_object(entries: Vec<String>) -> String {
    if entries.is_empty() {
        return "{}".to_string();
    }
    format!("{{{NEW_LINE} {}{NEW_LINE}}}", entries.join(ENTRY_SEPARATOR))
}

fn object_to_json(map: &serde_json::Map<String, Value>) -> String {
    let entries = map
        .iter()
        .filter_map(|(key, value)| {
            let rendered = value_to_json(value).or_else(|| {
                log::warn!("skipping field '{key}': null value has no sample representation");
                None
            })?;
            Some(format!(
                "{QUOTE}{}{QUOTE}: {rendered}",
                escape_value_text(key)
            ))
        })
        .collect();
    frame_object(entries)
}

fn array_to_json(items: &[Value]) -> String {
    let elements: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            // Structured-looking text is embedded as the document it denotes.
            Value::String(s) if s.starts_with('{') => Some(escape_text(s)),
            other => value_to_json(other).or_else(|| {
                log::warn!("skipping array element: null value has no sample representation");
                None
            }),
        })
        .collect();
    format!("[{}]", elements.join(", "))
}

/// `None` for values with no sample representation.
fn value_to_json(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => {
            let unescaped = s.replace("\\\"", "\"");
            Some(format!("{QUOTE}{}{QUOTE}", escape_value_text(&unescaped)))
        }
        Value::Object(map) => Some(object_to_json(map)),
        Value::Array(items) => Some(array_to_json(items)),
    }
}

#[cfg(test)]
mod tests {
    use oapm_core::model::SchemaField;
    use serde_json::json;

    use super::*;

    fn person_schema() -> SchemaDescriptor {
        SchemaDescriptor {
            fields: vec![
                SchemaField::new("firstname", FieldKind::String),
                SchemaField::new("lastname", FieldKind::String),
                SchemaField::new("age", FieldKind::Number),
                SchemaField::new("birthDate", FieldKind::Date),
            ],
            example: None,
        }
    }

    #[test]
    fn test_schema_to_json() {
        let expected = r#"{\n \"firstname\": \"<string>\",\n \"lastname\": \"<string>\",\n \"age\": \"<number>\",\n \"birthDate\": \"<date>\"\n}"#;
        assert_eq!(schema_to_json(&person_schema()).as_str(), expected);
    }

    #[test]
    fn test_schema_to_json_is_deterministic() {
        let schema = person_schema();
        assert_eq!(schema_to_json(&schema), schema_to_json(&schema));
    }

    #[test]
    fn test_schema_field_count_and_commas() {
        let schema = person_schema();
        let text = schema_to_json(&schema);
        assert_eq!(text.as_str().matches(": ").count(), 4);
        assert_eq!(text.as_str().matches(',').count(), 3);
        assert!(!text.as_str().contains(",\\n}"));
    }

    #[test]
    fn test_boolean_and_other_fields_are_strings() {
        let schema = SchemaDescriptor {
            fields: vec![
                SchemaField::new("active", FieldKind::Boolean),
                SchemaField::new("address", FieldKind::Other),
            ],
            example: None,
        };
        insta::assert_snapshot!(
            schema_to_json(&schema),
            @r#"{\n \"active\": \"<string>\",\n \"address\": \"<string>\"\n}"#
        );
    }

    #[test]
    fn test_empty_schema() {
        let schema = SchemaDescriptor::default();
        assert_eq!(schema_to_json(&schema).as_str(), "{}");
    }

    #[test]
    fn test_example_object() {
        let value = json!({"id": 1, "city": "Amsterdam"});
        insta::assert_snapshot!(
            example_to_json(Some(&value)),
            @r#"{\n \"id\": 1,\n \"city\": \"Amsterdam\"\n}"#
        );
    }

    #[test]
    fn test_example_nested_object() {
        let value = json!({"id": 1, "city": {"name": "Amsterdam", "country": {"code": "NL"}}});
        insta::assert_snapshot!(
            example_to_json(Some(&value)),
            @r#"{\n \"id\": 1,\n \"city\": {\n \"name\": \"Amsterdam\",\n \"country\": {\n \"code\": \"NL\"\n}\n}\n}"#
        );
    }

    #[test]
    fn test_example_arrays() {
        let value = json!({"tags": ["a", "b"], "empty": [], "mixed": [1, true, {"k": "v"}]});
        insta::assert_snapshot!(
            example_to_json(Some(&value)),
            @r#"{\n \"tags\": [\"a\", \"b\"],\n \"empty\": [],\n \"mixed\": [1, true, {\n \"k\": \"v\"\n}]\n}"#
        );
    }

    #[test]
    fn test_structured_string_in_array_is_embedded() {
        let value = json!({"items": ["{\"a\": 1}"]});
        assert_eq!(
            example_to_json(Some(&value)).as_str(),
            r#"{\n \"items\": [{\"a\": 1}]\n}"#
        );
    }

    #[test]
    fn test_structured_string_value_quotes_escaped_twice() {
        let value = json!({"metadata": "{\"env\": \"live\"}"});
        assert_eq!(
            example_to_json(Some(&value)).as_str(),
            r#"{\n \"metadata\": \"{\\\"env\\\": \\\"live\\\"}\"\n}"#
        );
    }

    #[test]
    fn test_pre_escaped_quotes_are_not_doubled() {
        let raw = json!({"note": "say \\\"hi\\\""});
        let plain = json!({"note": "say \"hi\""});
        assert_eq!(example_to_json(Some(&raw)), example_to_json(Some(&plain)));
    }

    #[test]
    fn test_null_fields_are_skipped() {
        let value = json!({"a": 1, "b": null, "c": "x"});
        assert_eq!(
            example_to_json(Some(&value)).as_str(),
            r#"{\n \"a\": 1,\n \"c\": \"x\"\n}"#
        );
        let list = json!([null, 2]);
        assert_eq!(example_to_json(Some(&list)).as_str(), "[2]");
    }

    #[test]
    fn test_absent_and_null_are_empty() {
        assert!(example_to_json(None).is_empty());
        assert!(example_to_json(Some(&Value::Null)).is_empty());
    }

    #[test]
    fn test_scalar_examples_are_literal() {
        assert_eq!(example_to_json(Some(&json!(42))).as_str(), "42");
        assert_eq!(example_to_json(Some(&json!(false))).as_str(), "false");
    }

    #[test]
    fn test_string_example_is_parsed_as_json() {
        let text = json!("{\"id\": 7}");
        assert_eq!(
            example_to_json(Some(&text)).as_str(),
            r#"{\n \"id\": 7\n}"#
        );
    }

    #[test]
    fn test_json_text_matches_value_layout() {
        let text = r#"{"id": 1, "city": {"name": "Amsterdam"}, "tags": ["a"]}"#;
        let value = json!({"id": 1, "city": {"name": "Amsterdam"}, "tags": ["a"]});
        assert_eq!(format_json(text), example_to_json(Some(&value)));
        assert!(format_json("null").is_empty());
    }

    #[test]
    fn test_malformed_json_text_is_empty() {
        assert!(format_json("{not json").is_empty());
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a \"b\"\nc\\"), r#"a \"b\"\nc\\"#);
        assert_eq!(escape_text("plain"), "plain");
    }

    #[test]
    fn test_output_decodes_to_json() {
        let value = json!({"id": 1, "note": "line\nbreak \"q\"", "list": ["x", {"y": [1, 2]}]});
        let text = example_to_json(Some(&value));
        let carried: String = serde_json::from_str(&format!("\"{text}\"")).unwrap();
        let decoded: Value = serde_json::from_str(&carried).unwrap();
        assert_eq!(decoded, value);
    }
}
