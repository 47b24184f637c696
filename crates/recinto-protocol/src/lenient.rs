//! Tolerant field decoders for the session snapshot.
//!
//! The backend is loosely typed: seat numbers may arrive as numbers or
//! numeric strings, lists may be `null`, nested objects may be missing.
//! A field that cannot be read is treated as absent rather than failing
//! the whole snapshot.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interpret a JSON value as a finite number (numbers and numeric strings).
pub fn as_finite_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Interpret a JSON value as an integral number.
pub fn as_integer(value: &Value) -> Option<i64> {
    let n = as_finite_f64(value)?;
    if n.fract() != 0.0 || n < i64::MIN as f64 || n > i64::MAX as f64 {
        return None;
    }
    Some(n as i64)
}

/// Seat numbers: positive integers that fit in a `u32`.
pub fn opt_seat<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_integer(&value).and_then(|n| u32::try_from(n).ok()))
}

/// Counts and quorum: integers only. A float such as `7.5` is absent.
pub fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64(),
        _ => None,
    })
}

/// Only a JSON boolean counts; `"false"` or `0` are treated as absent.
pub fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool())
}

/// Identifier-like fields rendered to their string form.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Free-text fields; missing or non-string becomes an empty string.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string(deserializer)?.unwrap_or_default())
}

/// Nested objects; anything that does not decode as `T` is absent.
pub fn opt_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// Lists; a non-array is empty and undecodable elements are skipped.
pub fn vec_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Lists where every element counts; undecodable elements keep their slot
/// as `T::default()`.
pub fn vec_or_default<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_strings_are_numbers() {
        assert_eq!(as_integer(&json!("12")), Some(12));
        assert_eq!(as_integer(&json!(" 3 ")), Some(3));
        assert_eq!(as_integer(&json!(4.0)), Some(4));
    }

    #[test]
    fn test_non_numeric_values_are_absent() {
        assert_eq!(as_integer(&json!("abc")), None);
        assert_eq!(as_integer(&json!(2.5)), None);
        assert_eq!(as_integer(&json!(null)), None);
        assert_eq!(as_integer(&json!([1])), None);
        assert_eq!(as_finite_f64(&json!("inf")), None);
    }
}
