//! Lenient decoding for money fields.
//!
//! The API serializes decimal columns as JSON strings (`"150.00"`) but
//! hand-written fixtures and older servers send plain numbers. Both decode
//! to `f64`.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid decimal: {}", s))),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Priced {
        #[serde(default, deserialize_with = "super::deserialize_optional")]
        price: Option<f64>,
    }

    #[test]
    fn test_accepts_number_string_and_null() {
        let a: Priced = serde_json::from_str(r#"{"price": 150}"#).unwrap();
        let b: Priced = serde_json::from_str(r#"{"price": "150.50"}"#).unwrap();
        let c: Priced = serde_json::from_str(r#"{"price": null}"#).unwrap();
        let d: Priced = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(a.price, Some(150.0));
        assert_eq!(b.price, Some(150.5));
        assert_eq!(c.price, None);
        assert_eq!(d.price, None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Priced>(r#"{"price": "lots"}"#).is_err());
    }
}
