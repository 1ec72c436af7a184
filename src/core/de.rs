//! Lenient deserializers for the loosely-typed fields of protocol and data JSON

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Fields that are `true`, a non-empty string, or absent/false
pub fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

/// Fields that are either a string payload or a boolean flag
///
/// `"Fire"` -> `Some("Fire")`, `true` -> `Some("")`, `false`/null -> `None`.
pub fn flag_or_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        other if is_truthy(&other) => Some(String::new()),
        _ => None,
    })
}

/// Strings where the empty string means "nothing"
pub fn non_empty_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
