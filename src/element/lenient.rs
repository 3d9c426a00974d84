use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes an optional leaf, dropping values of the wrong shape instead
/// of failing the whole patch. Numeric strings are accepted for numeric leaves.
pub(crate) fn leaf<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce(value))
}

pub(crate) fn coerce<T: DeserializeOwned>(value: Value) -> Option<T> {
    if value.is_null() {
        return None;
    }

    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            if let Some(parsed) = value.as_str().and_then(numeric_string) {
                if let Ok(parsed) = serde_json::from_value::<T>(parsed) {
                    return Some(parsed);
                }
            }
            tracing::warn!(%err, %value, "ignoring malformed property value");
            None
        }
    }
}

fn numeric_string(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Value::from(int));
    }
    raw.parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .map(Value::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_accepts_matching_values() {
        assert_eq!(coerce::<f64>(json!(1.5)), Some(1.5));
        assert_eq!(coerce::<String>(json!("solid")), Some("solid".to_string()));
    }

    #[test]
    fn coerce_parses_numeric_strings_for_numbers() {
        assert_eq!(coerce::<f64>(json!("2.25")), Some(2.25));
        assert_eq!(coerce::<i64>(json!(" 4 ")), Some(4));
    }

    #[test]
    fn coerce_drops_non_numeric_values_for_numbers() {
        assert_eq!(coerce::<f64>(json!("wide")), None);
        assert_eq!(coerce::<f64>(json!({ "px": 2 })), None);
        assert_eq!(coerce::<f64>(Value::Null), None);
    }
}
