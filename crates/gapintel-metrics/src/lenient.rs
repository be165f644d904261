//! Forgiving `deserialize_with` helpers for worker-produced fields.
//!
//! The worker is unversioned: counts arrive as integers, floats, numeric
//! strings, or `null` depending on which stage wrote them. These helpers fold
//! all of those into a sensible value instead of failing the whole payload.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::numeric::round_count;

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

fn value_to_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value_to_f64(value).map(round_count)
}

pub(crate) fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_count(&value).unwrap_or(0))
}

pub(crate) fn opt_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_count(&value))
}

pub(crate) fn float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value).unwrap_or(0.0))
}

pub(crate) fn opt_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value))
}

pub(crate) fn opt_rank<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_count(&value).and_then(|n| u32::try_from(n).ok()))
}

pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

pub(crate) fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        other => value_to_f64(&other).is_some_and(|f| f != 0.0),
    })
}

/// Accepts a single string, an array of strings, or anything else (empty).
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => vec![s],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                Value::String(_) | Value::Null => None,
                Value::Object(ref map) => map
                    .get("text")
                    .or_else(|| map.get("quote"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::count")]
        n: u64,
        #[serde(default, deserialize_with = "super::opt_count")]
        maybe: Option<u64>,
        #[serde(default, deserialize_with = "super::string_list")]
        list: Vec<String>,
        #[serde(default, deserialize_with = "super::flag")]
        on: bool,
    }

    fn probe(value: serde_json::Value) -> Probe {
        serde_json::from_value(value).expect("lenient probe never fails")
    }

    #[test]
    fn counts_accept_many_shapes() {
        assert_eq!(probe(json!({ "n": 12 })).n, 12);
        assert_eq!(probe(json!({ "n": 12.6 })).n, 13);
        assert_eq!(probe(json!({ "n": " 40 " })).n, 40);
        assert_eq!(probe(json!({ "n": null })).n, 0);
        assert_eq!(probe(json!({ "n": -5 })).n, 0);
        assert_eq!(probe(json!({ "n": "lots" })).n, 0);
        assert_eq!(probe(json!({})).n, 0);
    }

    #[test]
    fn optional_count_distinguishes_missing() {
        assert_eq!(probe(json!({})).maybe, None);
        assert_eq!(probe(json!({ "maybe": null })).maybe, None);
        assert_eq!(probe(json!({ "maybe": "7" })).maybe, Some(7));
    }

    #[test]
    fn string_list_accepts_scalar_and_objects() {
        assert_eq!(probe(json!({ "list": "one" })).list, vec!["one"]);
        assert_eq!(
            probe(json!({ "list": ["a", null, { "text": "b" }, 3] })).list,
            vec!["a", "b", "3"]
        );
        assert!(probe(json!({ "list": { "x": 1 } })).list.is_empty());
    }

    #[test]
    fn flag_accepts_strings_and_numbers() {
        assert!(probe(json!({ "on": "yes" })).on);
        assert!(probe(json!({ "on": 1 })).on);
        assert!(!probe(json!({ "on": 0 })).on);
        assert!(!probe(json!({ "on": null })).on);
    }
}
