//! Helpers for raw attribute values
//!
//! The configuration API stores every directive as a string; multi-valued
//! directives are comma-joined (`"a,b,c"`).

use serde_json::Value;

/// Attribute name → raw value, as exchanged with the configuration API
pub type AttributeMap = serde_json::Map<String, Value>;

/// Display text of a raw value; `None` for null or empty values
pub fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Array(items) => join_multi_value(items),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        other => other.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Join list items into the server's comma-separated form, skipping empty items
pub fn join_multi_value(items: &[Value]) -> String {
    items
        .iter()
        .filter_map(value_text)
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a comma-separated value into its trimmed, non-empty items
pub fn split_multi_value(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
