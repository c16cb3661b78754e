//! The accounts stream
//!
//! Lists every account the API token can see. Parent of all other streams:
//! each record yields an account context for the child streams.

use super::TapStream;
use serde_json::{json, Value};

/// GET /accounts
pub struct AccountsStream;

impl TapStream for AccountsStream {
    fn name(&self) -> &'static str {
        "accounts"
    }

    fn path(&self) -> &'static str {
        "/accounts"
    }

    fn records_path(&self) -> &'static str {
        "$.accounts[*]"
    }

    fn key_properties(&self) -> Vec<String> {
        vec!["accountId".to_string()]
    }

    fn is_child(&self) -> bool {
        false
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "accountId": {
                    "type": ["integer", "null"],
                    "description": "The Account's ID"
                },
                "accountName": {
                    "type": ["string", "null"],
                    "description": "Given name for the account"
                },
                "accountType": {
                    "type": ["string", "null"],
                    "description": "Type of account"
                },
                "userRole": {
                    "type": ["string", "null"],
                    "description": "Role granted to the user querying the account"
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReplicationMethod;

    #[test]
    fn test_definition() {
        let stream = AccountsStream;
        assert_eq!(stream.name(), "accounts");
        assert_eq!(stream.path(), "/accounts");
        assert_eq!(stream.key_properties(), vec!["accountId"]);
        assert_eq!(stream.replication_key(), None);
        assert_eq!(stream.replication_method(), ReplicationMethod::FullTable);
        assert!(!stream.is_child());
    }

    #[test]
    fn test_schema_fields() {
        let schema = AccountsStream.schema();
        let props = schema["properties"].as_object().unwrap();
        assert_eq!(props.len(), 4);
        assert!(props.contains_key("accountId"));
        assert!(props.contains_key("accountType"));
    }
}
