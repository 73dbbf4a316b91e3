//! Forgiving field decoders for browser-sent payloads.
//!
//! Browsers send whatever their forms produce; a wrong type never rejects the
//! whole command, it reads as the field's zero value instead.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// JSON numbers truncate toward zero and saturate to the `i32` range;
/// anything else reads as 0.
pub(crate) fn int<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.clamp(i32::MIN as i64, i32::MAX as i64) as i32
            } else {
                // `as` saturates and maps NaN to 0
                n.as_f64().map(|f| f as i32).unwrap_or(0)
            }
        }
        _ => 0,
    })
}

/// Strings pass through; anything else reads as empty.
pub(crate) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Arrays keep their string entries; anything else reads as empty.
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
