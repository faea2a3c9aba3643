/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Textual rendering of configuration values.

use serde_json::Value;

/// Render a value as the text that replaces a macro.
///
/// - String: returned as-is
/// - Number: decimal form
/// - Bool: "true" or "" (empty for false)
/// - Null: ""
/// - Array / Object: compact JSON
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => String::new(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Whether a value is a scalar (string, number or bool).
pub fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}
