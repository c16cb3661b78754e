//! Singer catalog
//!
//! Discovery mode (`--discover`) emits a catalog describing every stream.
//! A sync run can then be handed the catalog back (`--catalog catalog.json`)
//! with selection metadata controlling which streams to replicate.

use crate::error::{Error, Result};
use crate::types::ReplicationMethod;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

/// The full stream catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub streams: Vec<CatalogEntry>,
}

/// One stream in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub tap_stream_id: String,
    pub stream: String,
    pub schema: Value,
    #[serde(default)]
    pub key_properties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
    pub replication_method: ReplicationMethod,
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
}

/// Singer metadata entry with its breadcrumb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub breadcrumb: Vec<String>,
    pub metadata: Value,
}

impl Catalog {
    /// Load a catalog from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::config(format!("Failed to read catalog file: {e}")))?;
        Self::from_json(&contents)
    }

    /// Parse a catalog from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid catalog JSON: {e}")))
    }

    /// Find a stream entry by name
    pub fn get_stream(&self, name: &str) -> Option<&CatalogEntry> {
        self.streams.iter().find(|s| s.tap_stream_id == name)
    }

    /// Whether a stream should be synced.
    ///
    /// Streams missing from the catalog, or without explicit selection
    /// metadata, are selected. Only `"selected": false` at the stream level
    /// opts a stream out.
    pub fn is_selected(&self, name: &str) -> bool {
        match self.get_stream(name) {
            Some(entry) => entry.is_selected(),
            None => true,
        }
    }
}

impl CatalogEntry {
    /// Whether this entry is selected for sync
    pub fn is_selected(&self) -> bool {
        self.metadata
            .iter()
            .find(|m| m.breadcrumb.is_empty())
            .and_then(|m| m.metadata.get("selected"))
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Build a catalog entry for a stream definition
    pub fn for_stream(
        name: &str,
        schema: Value,
        key_properties: Vec<String>,
        replication_key: Option<String>,
        replication_method: ReplicationMethod,
    ) -> Self {
        let mut stream_metadata = json!({
            "inclusion": "available",
            "selected-by-default": true,
            "table-key-properties": key_properties.clone(),
        });
        if let Some(ref key) = replication_key {
            stream_metadata["valid-replication-keys"] = json!([key]);
        }

        let mut metadata = vec![MetadataEntry {
            breadcrumb: vec![],
            metadata: stream_metadata,
        }];

        // Field-level metadata: key and replication-key fields are automatic
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for field in properties.keys() {
                let inclusion = if key_properties.contains(field)
                    || replication_key.as_deref() == Some(field)
                {
                    "automatic"
                } else {
                    "available"
                };
                metadata.push(MetadataEntry {
                    breadcrumb: vec!["properties".to_string(), field.clone()],
                    metadata: json!({"inclusion": inclusion}),
                });
            }
        }

        Self {
            tap_stream_id: name.to_string(),
            stream: name.to_string(),
            schema,
            key_properties,
            replication_key,
            replication_method,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_selected(selected: Option<bool>) -> CatalogEntry {
        let mut entry = CatalogEntry::for_stream(
            "accounts",
            json!({"type": "object", "properties": {"accountId": {"type": "integer"}}}),
            vec!["accountId".to_string()],
            None,
            ReplicationMethod::FullTable,
        );
        if let Some(s) = selected {
            entry.metadata[0].metadata["selected"] = json!(s);
        }
        entry
    }

    #[test]
    fn test_selected_by_default() {
        assert!(entry_with_selected(None).is_selected());
        assert!(entry_with_selected(Some(true)).is_selected());
        assert!(!entry_with_selected(Some(false)).is_selected());
    }

    #[test]
    fn test_missing_stream_is_selected() {
        let catalog = Catalog::default();
        assert!(catalog.is_selected("transactions"));
    }

    #[test]
    fn test_key_fields_are_automatic() {
        let entry = CatalogEntry::for_stream(
            "transactions",
            json!({"type": "object", "properties": {
                "id": {"type": "integer"},
                "transactionDate": {"type": "string"},
                "commissionStatus": {"type": "string"}
            }}),
            vec!["id".to_string()],
            Some("transactionDate".to_string()),
            ReplicationMethod::Incremental,
        );

        let field_meta = |field: &str| -> String {
            entry
                .metadata
                .iter()
                .find(|m| m.breadcrumb == vec!["properties", field])
                .unwrap()
                .metadata["inclusion"]
                .as_str()
                .unwrap()
                .to_string()
        };

        assert_eq!(field_meta("id"), "automatic");
        assert_eq!(field_meta("transactionDate"), "automatic");
        assert_eq!(field_meta("commissionStatus"), "available");
    }

    #[test]
    fn test_catalog_round_trip() {
        let catalog = Catalog {
            streams: vec![entry_with_selected(Some(false))],
        };
        let json = serde_json::to_string(&catalog).unwrap();
        let parsed = Catalog::from_json(&json).unwrap();
        assert!(!parsed.is_selected("accounts"));
    }

    #[test]
    fn test_valid_replication_keys_present() {
        let entry = CatalogEntry::for_stream(
            "transactions",
            json!({"type": "object", "properties": {}}),
            vec!["id".to_string()],
            Some("transactionDate".to_string()),
            ReplicationMethod::Incremental,
        );
        assert_eq!(
            entry.metadata[0].metadata["valid-replication-keys"][0],
            "transactionDate"
        );
    }
}
