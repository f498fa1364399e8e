//! Lenient accessors for untrusted JSON.
//!
//! Cached blobs, backend payloads and generated content all arrive as
//! loosely shaped JSON. These helpers read a field if it has the expected
//! shape and return `None` otherwise, so normalizers never fail.

use serde_json::{Map, Value};

/// A non-empty string field, trimmed for the emptiness check only.
pub(crate) fn non_empty_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// A string field, or an empty string.
pub(crate) fn string_or_empty(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// A string or numeric field rendered as a string. Used for identifiers,
/// which the backend sends as integers and the client generates as strings.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A non-negative integer field.
pub(crate) fn non_negative_int(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Parse a value that may be an object or a JSON-encoded object string.
///
/// Anything else, including a string that fails to parse, yields `None`;
/// the failure is logged as a warning with `context` for identification.
pub(crate) fn object_or_encoded(value: &Value, context: &str) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map.clone()),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => {
                log::warn!("[Normalize] {} is not a JSON object, using empty value", context);
                None
            }
            Err(e) => {
                log::warn!("[Normalize] Failed to parse {}: {}", context, e);
                None
            }
        },
        _ => None,
    }
}
