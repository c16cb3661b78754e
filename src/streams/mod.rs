//! Stream definitions
//!
//! Each Awin endpoint is a stream. `accounts` is the parent; the other
//! streams are synced once per account discovered there, with the account id
//! and type interpolated into their paths.

pub mod accounts;
pub mod publishers;
pub mod reports;
pub mod transactions;

pub use accounts::AccountsStream;
pub use publishers::PublishersStream;
pub use reports::PublisherReportStream;
pub use transactions::TransactionsStream;

use crate::config::TapConfig;
use crate::types::ReplicationMethod;
use crate::windows::DateWindow;
use serde_json::Value;

/// Parent context for child streams: one synced Awin account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountContext {
    pub account_id: String,
    pub account_type: String,
}

impl AccountContext {
    /// Build a context from an accounts record
    pub fn from_record(record: &Value) -> Option<Self> {
        let account_id = match record.get("accountId")? {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            _ => return None,
        };
        let account_type = record.get("accountType")?.as_str()?.to_string();
        Some(Self {
            account_id,
            account_type,
        })
    }

    /// Whether this account is an advertiser
    pub fn is_advertiser(&self) -> bool {
        self.account_type == "advertiser"
    }

    /// Template context values for path rendering
    pub fn to_template_value(&self) -> Value {
        serde_json::json!({
            "account_id": self.account_id,
            "account_type": self.account_type,
        })
    }
}

/// A stream the tap can replicate
pub trait TapStream: Send + Sync {
    /// Stream name as it appears in catalog and messages
    fn name(&self) -> &'static str;

    /// Endpoint path, possibly with `{{ ... }}` template variables
    fn path(&self) -> &'static str;

    /// JSON schema for the stream's records
    fn schema(&self) -> Value;

    /// Primary key fields
    fn key_properties(&self) -> Vec<String>;

    /// Replication key field for incremental streams
    fn replication_key(&self) -> Option<&'static str> {
        None
    }

    /// JSONPath locating records in the response body
    fn records_path(&self) -> &'static str;

    /// How the stream replicates
    fn replication_method(&self) -> ReplicationMethod {
        match self.replication_key() {
            Some(_) => ReplicationMethod::Incremental,
            None => ReplicationMethod::FullTable,
        }
    }

    /// Whether this stream is synced per account
    fn is_child(&self) -> bool {
        true
    }

    /// Whether this stream applies to the given account
    fn applies_to(&self, _account: &AccountContext) -> bool {
        true
    }

    /// Query parameters for one request
    fn query_params(&self, _config: &TapConfig, _window: Option<&DateWindow>) -> Vec<(String, String)> {
        vec![]
    }

    /// Adjust a record after extraction, before emission
    fn postprocess(&self, _record: &mut Value, _window: Option<&DateWindow>) {}
}

/// All streams the tap knows about, parent first
pub fn all_streams() -> Vec<Box<dyn TapStream>> {
    vec![
        Box::new(AccountsStream),
        Box::new(TransactionsStream),
        Box::new(PublishersStream),
        Box::new(PublisherReportStream),
    ]
}

/// Shared schema fragment for Awin money objects
pub(crate) fn money_schema() -> Value {
    serde_json::json!({
        "type": ["object", "null"],
        "properties": {
            "amount": {"type": ["number", "null"]},
            "currency": {"type": ["string", "null"]}
        }
    })
}
