//! The publisher_report stream
//!
//! Aggregated performance report grouped by publisher, one row per
//! publisher per day. The API does not echo the report date back in each
//! row, so the window start is injected as `transactionDate` after
//! extraction.

use super::TapStream;
use crate::auth::ACCESS_TOKEN_PARAM;
use crate::config::TapConfig;
use crate::windows::DateWindow;
use serde_json::{json, Value};

/// GET /{account_type}s/{account_id}/reports/publisher
pub struct PublisherReportStream;

impl TapStream for PublisherReportStream {
    fn name(&self) -> &'static str {
        "publisher_report"
    }

    fn path(&self) -> &'static str {
        "/{{ account_type }}s/{{ account_id }}/reports/publisher"
    }

    fn records_path(&self) -> &'static str {
        "$[*]"
    }

    fn key_properties(&self) -> Vec<String> {
        vec![
            "advertiserId".to_string(),
            "publisherId".to_string(),
            "transactionDate".to_string(),
        ]
    }

    fn replication_key(&self) -> Option<&'static str> {
        Some("transactionDate")
    }

    fn query_params(
        &self,
        config: &TapConfig,
        window: Option<&DateWindow>,
    ) -> Vec<(String, String)> {
        let mut params = vec![
            ("timezone".to_string(), config.timezone.clone()),
            ("dateType".to_string(), "transaction".to_string()),
            (ACCESS_TOKEN_PARAM.to_string(), config.api_token.clone()),
        ];
        if let Some(window) = window {
            // Report endpoints take bare dates, not datetimes
            params.push(("startDate".to_string(), window.start_date()));
            params.push(("endDate".to_string(), window.end_date()));
        }
        params
    }

    fn postprocess(&self, record: &mut Value, window: Option<&DateWindow>) {
        if let (Some(window), Some(obj)) = (window, record.as_object_mut()) {
            obj.insert(
                "transactionDate".to_string(),
                Value::String(window.start_datetime()),
            );
        }
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "advertiserId": {"type": ["integer", "null"]},
                "advertiserName": {"type": ["string", "null"]},
                "publisherId": {"type": ["integer", "null"]},
                "publisherName": {"type": ["string", "null"]},
                "transactionDate": {"type": ["string", "null"], "format": "date-time"},
                "region": {"type": ["string", "null"]},
                "currency": {"type": ["string", "null"]},
                "impressions": {"type": ["number", "null"]},
                "clicks": {"type": ["number", "null"]},
                "pendingNo": {"type": ["number", "null"]},
                "pendingValue": {"type": ["number", "null"]},
                "pendingComm": {"type": ["number", "null"]},
                "confirmedNo": {"type": ["number", "null"]},
                "confirmedValue": {"type": ["number", "null"]},
                "confirmedComm": {"type": ["number", "null"]},
                "bonusNo": {"type": ["number", "null"]},
                "bonusValue": {"type": ["number", "null"]},
                "bonusComm": {"type": ["number", "null"]},
                "totalNo": {"type": ["number", "null"]},
                "totalValue": {"type": ["number", "null"]},
                "totalComm": {"type": ["number", "null"]},
                "declinedNo": {"type": ["number", "null"]},
                "declinedValue": {"type": ["number", "null"]},
                "declinedComm": {"type": ["number", "null"]},
                "tags": {
                    "type": ["array", "null"],
                    "items": {"type": ["string", "null"]}
                }
            }
        })
    }
}
