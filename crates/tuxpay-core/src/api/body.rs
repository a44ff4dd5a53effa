//! Response body shapes the pipeline knows how to read.
//!
//! A body is classified once, when it is received, and every later question
//! (what error did the server report, which warnings came back) is answered
//! from that classification.

use serde::Deserialize;
use serde_json::Value;

/// What the caller asked the server for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// A JSON document
    Json,
    /// A file download; error bodies arrive as raw bytes too
    Binary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    Text(String),
    Binary(Vec<u8>),
}

impl ResponseBody {
    /// Classify a received body.
    ///
    /// Downloads keep their bytes untouched. JSON requests get a parsed
    /// document when the bytes are JSON, whatever the content type says,
    /// and text otherwise.
    pub fn classify(kind: ResponseKind, bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return ResponseBody::Empty;
        }
        match kind {
            ResponseKind::Binary => ResponseBody::Binary(bytes.to_vec()),
            ResponseKind::Json => match serde_json::from_slice(bytes) {
                Ok(value) => ResponseBody::Json(value),
                Err(_) => ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()),
            },
        }
    }

    /// The `error` message of a failed response, if one can be found.
    ///
    /// Binary bodies are decoded as UTF-8 text and then parsed as JSON.
    /// Text bodies already failed to parse as JSON, so they carry none.
    pub fn error_message(&self) -> Option<String> {
        match self {
            ResponseBody::Empty | ResponseBody::Text(_) => None,
            ResponseBody::Json(value) => error_field(value),
            ResponseBody::Binary(bytes) => std::str::from_utf8(bytes)
                .ok()
                .and_then(|text| serde_json::from_str(text).ok())
                .and_then(|v| error_field(&v)),
        }
    }

    /// Informational messages from `warning` and `warnings` fields.
    pub fn warnings(&self) -> Vec<String> {
        match self {
            ResponseBody::Json(value) => warning_messages(value),
            _ => Vec::new(),
        }
    }
}

fn error_field(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

/// Shapes a `warning`/`warnings` field takes in practice.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Warnings {
    One(String),
    Many(Vec<String>),
    Other(Value),
}

impl Warnings {
    fn into_messages(self) -> Vec<String> {
        match self {
            Warnings::One(message) => vec![message],
            Warnings::Many(messages) => messages,
            Warnings::Other(Value::Null) => Vec::new(),
            Warnings::Other(Value::Array(items)) => items.iter().map(value_text).collect(),
            Warnings::Other(other) => vec![other.to_string()],
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Warnings only live on object bodies; lists and scalars never carry them.
pub fn warning_messages(value: &Value) -> Vec<String> {
    let Some(object) = value.as_object() else {
        return Vec::new();
    };
    ["warning", "warnings"]
        .iter()
        .filter_map(|key| object.get(*key))
        .filter_map(|field| serde_json::from_value::<Warnings>(field.clone()).ok())
        .flat_map(Warnings::into_messages)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify() {
        assert_eq!(ResponseBody::classify(ResponseKind::Json, b""), ResponseBody::Empty);
        assert_eq!(
            ResponseBody::classify(ResponseKind::Json, br#"{"error":"x"}"#),
            ResponseBody::Json(json!({"error": "x"}))
        );
        assert_eq!(
            ResponseBody::classify(ResponseKind::Json, b"<html>Bad Gateway</html>"),
            ResponseBody::Text("<html>Bad Gateway</html>".to_string())
        );
        assert_eq!(
            ResponseBody::classify(ResponseKind::Binary, br#"{"error":"x"}"#),
            ResponseBody::Binary(br#"{"error":"x"}"#.to_vec())
        );
    }

    #[test]
    fn test_error_message_from_each_shape() {
        assert_eq!(
            ResponseBody::Json(json!({"error": "bad currency code - XYZ"})).error_message(),
            Some("bad currency code - XYZ".to_string())
        );
        assert_eq!(
            ResponseBody::Binary(br#"{"error": "not found"}"#.to_vec()).error_message(),
            Some("not found".to_string())
        );
        assert_eq!(ResponseBody::Json(json!({"detail": "x"})).error_message(), None);
        assert_eq!(ResponseBody::Json(json!({"error": null})).error_message(), None);
        assert_eq!(ResponseBody::Binary(vec![0xff, 0xfe, 0x00]).error_message(), None);
        assert_eq!(ResponseBody::Binary(b"%PDF-1.4".to_vec()).error_message(), None);
        assert_eq!(ResponseBody::Text("oops".to_string()).error_message(), None);
        assert_eq!(ResponseBody::Empty.error_message(), None);
    }

    #[test]
    fn test_json_error_is_read_once_at_classification() {
        let body = ResponseBody::classify(ResponseKind::Json, br#"{"error":"x"}"#);
        assert_eq!(body.error_message(), Some("x".to_string()));

        // A hand-built text body is never re-read as JSON
        assert_eq!(ResponseBody::Text(r#"{"error":"x"}"#.to_string()).error_message(), None);
    }

    #[test]
    fn test_warning_messages() {
        assert!(warning_messages(&json!({"payment": {}})).is_empty());
        assert!(warning_messages(&json!([{"warning": "ignored in lists"}])).is_empty());
        assert_eq!(
            warning_messages(&json!({"warning": "exchange rate is stale"})),
            vec!["exchange rate is stale"]
        );
        assert_eq!(
            warning_messages(&json!({"warning": "one", "warnings": ["two", "three"]})),
            vec!["one", "two", "three"]
        );
        assert_eq!(warning_messages(&json!({"warnings": [1, "two"]})), vec!["1", "two"]);
        assert!(warning_messages(&json!({"warning": null})).is_empty());
    }
}
