//! Serde helpers for fields that must never fail to deserialize.
//!
//! Source data comes from spreadsheets and Companies House payloads, where a
//! day of month may be `31` or `"31"` and dates may be blank or malformed.
//! Values are captured as trimmed text and interpreted later, so one bad
//! cell degrades to "not set" instead of rejecting the whole file.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// Any scalar as optional text, blank strings become `None`
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        let s = match v {
            Scalar::Text(s) => s.trim().to_string(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        };
        (!s.is_empty()).then_some(s)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default)]
        #[allow(dead_code)]
        id: Option<String>,
        #[serde(default, deserialize_with = "text")]
        value: Option<String>,
    }

    fn from_json(json: &str) -> Option<String> {
        serde_json::from_str::<Row>(json).unwrap().value
    }

    #[test]
    fn accepts_strings_and_numbers() {
        assert_eq!(from_json(r#"{"value": "31"}"#), Some("31".to_string()));
        assert_eq!(from_json(r#"{"value": 31}"#), Some("31".to_string()));
        assert_eq!(from_json(r#"{"value": " 2024-03-31 "}"#), Some("2024-03-31".to_string()));
    }

    #[test]
    fn blanks_and_nulls_are_none() {
        assert_eq!(from_json(r#"{"value": ""}"#), None);
        assert_eq!(from_json(r#"{"value": "   "}"#), None);
        assert_eq!(from_json(r#"{"value": null}"#), None);
        assert_eq!(from_json(r#"{}"#), None);
    }

    #[test]
    fn csv_cells() {
        let data = "id,value\na,03\nb,\nc,xyz\n";
        let mut rdr = csv::ReaderBuilder::new().from_reader(data.as_bytes());
        let rows: Vec<Option<String>> = rdr
            .deserialize::<Row>()
            .map(|r| r.unwrap().value)
            .collect();
        assert_eq!(rows, vec![Some("3".to_string()), None, Some("xyz".to_string())]);
    }
}
