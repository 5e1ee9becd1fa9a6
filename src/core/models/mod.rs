pub mod cost_model;
pub mod report;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Accept a JSON number or a numeric string; anything else (including
/// non-finite values) becomes `None`.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

/// Decode an optional field, treating a value of the wrong shape as absent.
pub(crate) fn lenient_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Decode an array, skipping elements that do not fit `T`. A non-array
/// value yields an empty list.
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Array(entries)) = value else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}

pub(crate) fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_as_f64_accepts_numbers_and_numeric_strings() {
        assert_eq!(value_as_f64(&json!(12.5)), Some(12.5));
        assert_eq!(value_as_f64(&json!("7.25")), Some(7.25));
        assert_eq!(value_as_f64(&json!(" 3 ")), Some(3.0));
    }

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "lenient_opt")]
        one: Option<u32>,
        #[serde(default, deserialize_with = "lenient_vec")]
        many: Vec<u32>,
    }

    #[test]
    fn lenient_fields_drop_wrong_shapes() {
        let h: Holder = serde_json::from_value(json!({ "one": "x", "many": [1, "two", 3] })).unwrap();
        assert_eq!(h.one, None);
        assert_eq!(h.many, vec![1, 3]);
        let h: Holder = serde_json::from_value(json!({ "many": { "a": 1 } })).unwrap();
        assert!(h.many.is_empty());
    }

    #[test]
    fn value_as_f64_rejects_garbage() {
        assert_eq!(value_as_f64(&json!("abc")), None);
        assert_eq!(value_as_f64(&json!("NaN")), None);
        assert_eq!(value_as_f64(&json!("inf")), None);
        assert_eq!(value_as_f64(&json!(null)), None);
        assert_eq!(value_as_f64(&json!({"value": 1})), None);
    }
}
