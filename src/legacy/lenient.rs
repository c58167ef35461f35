//! Tolerant deserializers for legacy document fields.
//!
//! Older documents store numbers as numbers, numeric strings or empty
//! strings depending on which form produced them. Empty strings and `null`
//! read as absent.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse().ok()
            }
        }
        _ => None,
    }
}

fn integer_from_value(value: &Value) -> Option<u32> {
    let n = number_from_value(value)?;
    if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 {
        Some(n as u32)
    } else {
        None
    }
}

/// Optional number; unparseable values read as absent.
pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

/// Number defaulting to 0 when absent or unparseable.
pub fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_number(deserializer)?.unwrap_or(0.0))
}

/// Optional non-negative integer.
pub fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(integer_from_value))
}

/// Optional flag; accepts booleans, `0`/`1` and `"true"`/`"false"`.
pub fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_f64().map(|x| x != 0.0),
        Some(Value::String(s)) => match s.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Element id, stored either as a number or a numeric string.
pub fn id<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    integer_from_value(&value)
        .ok_or_else(|| D::Error::custom(format!("invalid element id: {value}")))
}

fn parse_id_keys<T, E: Error>(raw: BTreeMap<String, T>) -> Result<BTreeMap<u32, T>, E> {
    raw.into_iter()
        .map(|(key, value)| {
            key.trim()
                .parse::<u32>()
                .map(|id| (id, value))
                .map_err(|_| E::custom(format!("invalid id key: {key}")))
        })
        .collect()
}

/// Object keyed by element id.
///
/// Keys are read as strings first; integer keys cannot be deserialized
/// directly inside structs that flatten passthrough fields.
pub fn id_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<u32, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw = BTreeMap::<String, T>::deserialize(deserializer)?;
    parse_id_keys(raw)
}

/// Optional object keyed by element id.
pub fn opt_id_map<'de, D, T>(deserializer: D) -> Result<Option<BTreeMap<u32, T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<BTreeMap<String, T>>::deserialize(deserializer)?
        .map(parse_id_keys)
        .transpose()
}
