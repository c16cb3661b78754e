//! Response decoding
//!
//! Awin responses are JSON. Each stream declares a records path such as
//! `$.accounts[*]` or `$[*]` that locates the record array inside the body.

use crate::error::{Error, Result};
use serde_json::Value;

/// Trait for decoding HTTP response bodies into records
pub trait RecordDecoder: Send + Sync {
    /// Decode a response body into a list of records
    fn decode(&self, body: &str) -> Result<Vec<Value>>;
}

/// JSON decoder with optional records path extraction
#[derive(Debug, Clone, Default)]
pub struct JsonDecoder {
    /// JSONPath to the record array
    records_path: Option<String>,
}

impl JsonDecoder {
    /// Create a decoder that treats the whole body as the record list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with a records path
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            records_path: Some(path.into()),
        }
    }

    /// Extract records from a parsed JSON value
    fn extract_records(&self, value: &Value) -> Result<Vec<Value>> {
        match &self.records_path {
            Some(path) => {
                // jsonpath-rust only for wildcard patterns; plain dot paths
                // go through the simple walker
                if path.contains('*') {
                    extract_with_jsonpath(value, path)
                } else {
                    match extract_simple_path(value, path) {
                        Some(Value::Array(arr)) => Ok(arr),
                        Some(v) => Ok(vec![v]),
                        None => Ok(vec![]),
                    }
                }
            }
            None => match value {
                Value::Array(arr) => Ok(arr.clone()),
                _ => Ok(vec![value.clone()]),
            },
        }
    }
}

impl RecordDecoder for JsonDecoder {
    fn decode(&self, body: &str) -> Result<Vec<Value>> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;
        self.extract_records(&value)
    }
}

/// Walk a plain dot-notation path like `$.accounts` or `data.items`
fn extract_simple_path(value: &Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    let mut current = value;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(current.clone())
}

/// Extract records using jsonpath-rust for wildcard paths
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{path}': {e}")))?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accounts_envelope() {
        let decoder = JsonDecoder::with_path("$.accounts[*]");
        let body = r#"{"userId": 1, "accounts": [
            {"accountId": 10, "accountName": "A", "accountType": "advertiser"},
            {"accountId": 20, "accountName": "B", "accountType": "publisher"}
        ]}"#;

        let records = decoder.decode(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["accountId"], 10);
        assert_eq!(records[1]["accountType"], "publisher");
    }

    #[test]
    fn test_top_level_array() {
        let decoder = JsonDecoder::with_path("$[*]");
        let body = r#"[{"id": 1}, {"id": 2}, {"id": 3}]"#;

        let records = decoder.decode(body).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2]["id"], 3);
    }

    #[test]
    fn test_missing_path_yields_empty() {
        let decoder = JsonDecoder::with_path("$.accounts");
        let records = decoder.decode(r#"{"other": []}"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_no_path_array_body() {
        let decoder = JsonDecoder::new();
        let records = decoder.decode(r#"[{"a": 1}]"#).unwrap();
        assert_eq!(records, vec![json!({"a": 1})]);
    }

    #[test]
    fn test_no_path_object_body() {
        let decoder = JsonDecoder::new();
        let records = decoder.decode(r#"{"a": 1}"#).unwrap();
        assert_eq!(records, vec![json!({"a": 1})]);
    }

    #[test]
    fn test_invalid_json() {
        let decoder = JsonDecoder::new();
        assert!(decoder.decode("not json").is_err());
    }

    #[test]
    fn test_simple_path_dot_notation() {
        let decoder = JsonDecoder::with_path("$.data.items");
        let body = r#"{"data": {"items": [{"x": 1}]}}"#;
        let records = decoder.decode(body).unwrap();
        assert_eq!(records.len(), 1);
    }
}
