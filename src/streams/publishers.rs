//! The publishers stream
//!
//! Publishers joined to an advertiser's programme. The endpoint only exists
//! for advertiser accounts; other account types are skipped.

use super::{AccountContext, TapStream};
use serde_json::{json, Value};

/// GET /advertisers/{account_id}/publishers/
pub struct PublishersStream;

impl TapStream for PublishersStream {
    fn name(&self) -> &'static str {
        "publishers"
    }

    fn path(&self) -> &'static str {
        "/advertisers/{{ account_id }}/publishers/"
    }

    fn records_path(&self) -> &'static str {
        "$[*]"
    }

    fn key_properties(&self) -> Vec<String> {
        vec!["id".to_string()]
    }

    fn applies_to(&self, account: &AccountContext) -> bool {
        account.is_advertiser()
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": ["integer", "null"],
                    "description": "The Publisher's ID"
                },
                "name": {
                    "type": ["string", "null"],
                    "description": "Publisher name"
                },
                "primaryRegion": {
                    "type": ["string", "null"],
                    "description": "Publisher primary region"
                },
                "salesRegions": {
                    "type": ["array", "null"],
                    "items": {"type": ["string", "null"]},
                    "description": "Additional sales regions of the publisher (if defined)"
                },
                "primaryType": {
                    "type": ["string", "null"],
                    "description": "Primary promotion type of the publisher"
                }
            }
        })
    }
}
