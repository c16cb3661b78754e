//! Singer protocol message types
//!
//! The tap talks to downstream targets with three message kinds, one JSON
//! object per stdout line:
//! - SCHEMA announces a stream and its JSON schema
//! - RECORD carries one extracted record
//! - STATE snapshots the bookmark state for resumption

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A Singer protocol message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Stream schema announcement
    #[serde(rename = "SCHEMA")]
    Schema {
        stream: String,
        schema: Value,
        key_properties: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        bookmark_properties: Vec<String>,
    },

    /// A single extracted record
    #[serde(rename = "RECORD")]
    Record {
        stream: String,
        record: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        time_extracted: Option<String>,
    },

    /// Bookmark state snapshot
    #[serde(rename = "STATE")]
    State { value: Value },
}

impl Message {
    /// Build a SCHEMA message
    pub fn schema(
        stream: impl Into<String>,
        schema: Value,
        key_properties: Vec<String>,
        bookmark_properties: Vec<String>,
    ) -> Self {
        Self::Schema {
            stream: stream.into(),
            schema,
            key_properties,
            bookmark_properties,
        }
    }

    /// Build a RECORD message stamped with the current time
    pub fn record(stream: impl Into<String>, record: Value) -> Self {
        Self::record_at(stream, record, Utc::now())
    }

    /// Build a RECORD message with an explicit extraction time
    pub fn record_at(stream: impl Into<String>, record: Value, extracted: DateTime<Utc>) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            time_extracted: Some(extracted.to_rfc3339_opts(SecondsFormat::Micros, true)),
        }
    }

    /// Build a STATE message
    pub fn state(value: Value) -> Self {
        Self::State { value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_message_shape() {
        let msg = Message::schema(
            "accounts",
            json!({"type": "object"}),
            vec!["accountId".to_string()],
            vec![],
        );
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["type"], "SCHEMA");
        assert_eq!(value["stream"], "accounts");
        assert_eq!(value["key_properties"][0], "accountId");
        // Empty bookmark_properties is omitted
        assert!(value.get("bookmark_properties").is_none());
    }

    #[test]
    fn test_record_message_shape() {
        let extracted = DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let msg = Message::record_at("transactions", json!({"id": 42}), extracted);
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["type"], "RECORD");
        assert_eq!(value["record"]["id"], 42);
        assert_eq!(value["time_extracted"], "2024-01-15T10:30:00.000000Z");
    }

    #[test]
    fn test_state_message_shape() {
        let msg = Message::state(json!({"bookmarks": {}}));
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["type"], "STATE");
        assert!(value["value"]["bookmarks"].is_object());
    }

    #[test]
    fn test_round_trip() {
        let msg = Message::state(json!({"bookmarks": {"transactions": {"x": 1}}}));
        let line = serde_json::to_string(&msg).unwrap();
        let parsed: Message = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, msg);
    }
}
