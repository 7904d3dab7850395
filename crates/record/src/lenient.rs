//! Field deserializers that coerce or default instead of failing.
//!
//! Tags are written by several apps, and older writers stored numbers as
//! strings. A field that cannot be coerced takes its default so that one odd
//! value never hides the rest of the record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::record::UsageEntry;
use crate::timestamp::UNSET_TIMESTAMP;

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| float_to_i64(n.as_f64()?)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| float_to_i64(s.parse::<f64>().ok()?))
        }
        _ => None,
    }
}

// `as` saturates, so out-of-range floats land on the i64 bounds.
fn float_to_i64(f: f64) -> Option<i64> {
    f.is_finite().then(|| f.trunc() as i64)
}

fn as_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_string(Value::deserialize(deserializer)?).unwrap_or_default())
}

pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_string(Value::deserialize(deserializer)?)
        .unwrap_or_else(|| UNSET_TIMESTAMP.to_string()))
}

/// Negative values read as 0 and values past `u32::MAX` clamp to it, so a
/// large id is never mistaken for a small one.
pub(crate) fn uint<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(n) => n.as_u64().map(|v| v.min(u32::MAX as u64) as i64),
        _ => None,
    };
    Ok(number
        .or_else(|| as_i64(&value))
        .map(|v| v.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0))
}

pub(crate) fn code<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_i64(&value)
        .and_then(|v| i32::try_from(v).ok())
        .unwrap_or(0))
}

/// Non-object items are dropped; object items always parse thanks to the
/// lenient field deserializers above.
pub(crate) fn entries<'de, D>(deserializer: D) -> Result<Vec<UsageEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
