//! Терпимые десериализаторы для полей, которые бэкенд присылает то строкой,
//! то числом.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Строка или число -> `Some(String)`, пустая строка и `null` -> `None`.
pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Число или числовая строка -> `Some(f64)`.
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|n| n.is_finite()))
}

/// Неотрицательное целое (число или строка), всё остальное -> 0.
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    Ok(parsed.unwrap_or_else(|| {
        tracing::debug!("Unparseable seat count, falling back to 0");
        0
    }))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::string")]
        id: Option<String>,
        #[serde(default, deserialize_with = "super::number")]
        price: Option<f64>,
        #[serde(default, deserialize_with = "super::count")]
        total: u32,
    }

    #[test]
    fn strings_and_numbers_are_interchangeable() {
        let a: Probe = serde_json::from_str(r#"{"id": 12, "price": "450.5", "total": "40"}"#).unwrap();
        let b: Probe = serde_json::from_str(r#"{"id": "12", "price": 450.5, "total": 40}"#).unwrap();
        assert_eq!(a.id.as_deref(), Some("12"));
        assert_eq!(a.id, b.id);
        assert_eq!(a.price, b.price);
        assert_eq!(a.total, 40);
        assert_eq!(b.total, 40);
    }

    #[test]
    fn missing_and_junk_values() {
        let p: Probe = serde_json::from_str(r#"{"id": "  ", "price": "n/a", "total": -1}"#).unwrap();
        assert_eq!(p.id, None);
        assert_eq!(p.price, None);
        assert_eq!(p.total, 0);

        let empty: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.id, None);
        assert_eq!(empty.total, 0);
    }
}
