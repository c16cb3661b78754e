//! The transactions stream
//!
//! Individual transactions per account, replicated incrementally over
//! day-sized date windows keyed on `transactionDate`.

use super::{money_schema, TapStream};
use crate::auth::ACCESS_TOKEN_PARAM;
use crate::config::TapConfig;
use crate::windows::DateWindow;
use serde_json::{json, Value};

/// GET /{account_type}s/{account_id}/transactions/
pub struct TransactionsStream;

impl TapStream for TransactionsStream {
    fn name(&self) -> &'static str {
        "transactions"
    }

    fn path(&self) -> &'static str {
        "/{{ account_type }}s/{{ account_id }}/transactions/"
    }

    fn records_path(&self) -> &'static str {
        "$[*]"
    }

    fn key_properties(&self) -> Vec<String> {
        vec!["id".to_string(), "transactionDate".to_string()]
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
            params.push(("startDate".to_string(), window.start_datetime()));
            params.push(("endDate".to_string(), window.end_datetime()));
        }
        params
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": {"type": ["integer", "null"]},
                "url": {"type": ["string", "null"]},
                "advertiserId": {"type": ["integer", "null"]},
                "publisherId": {"type": ["integer", "null"]},
                "commissionSharingPublisherId": {"type": ["integer", "null"]},
                "commissionSharingSelectedRatePublisherId": {"type": ["integer", "null"]},
                "siteName": {"type": ["string", "null"]},
                "campaign": {"type": ["string", "null"]},
                "commissionStatus": {"type": ["string", "null"]},
                "commissionAmount": money_schema(),
                "saleAmount": money_schema(),
                "ipHash": {"type": ["integer", "null"]},
                "customerCountry": {"type": ["string", "null"]},
                "clickRefs": {
                    "type": ["object", "null"],
                    "properties": {
                        "clickRefs": {"type": ["string", "null"]}
                    }
                },
                "clickDate": {"type": ["string", "null"], "format": "date-time"},
                "transactionDate": {"type": ["string", "null"], "format": "date-time"},
                "validationDate": {"type": ["string", "null"], "format": "date-time"},
                "type": {"type": ["string", "null"]},
                "declineReason": {"type": ["string", "null"]},
                "voucherCodeUsed": {"type": ["boolean", "null"]},
                "voucherCode": {"type": ["string", "null"]},
                "lapseTime": {"type": ["integer", "null"]},
                "amended": {"type": ["boolean", "null"]},
                "amendReason": {"type": ["string", "null"]},
                "oldSaleAmount": money_schema(),
                "oldCommissionAmount": money_schema(),
                "clickDevice": {"type": ["string", "null"]},
                "transactionDevice": {"type": ["string", "null"]},
                "publisherUrl": {"type": ["string", "null"]},
                "advertiserCountry": {"type": ["string", "null"]},
                "orderRef": {"type": ["string", "null"]},
                "customParameters": {
                    "type": ["array", "null"],
                    "items": {
                        "type": ["object", "null"],
                        "properties": {
                            "key": {"type": ["string", "null"]},
                            "value": {"type": ["string", "null"]}
                        }
                    }
                },
                "transactionParts": {
                    "type": ["array", "null"],
                    "items": {
                        "type": ["object", "null"],
                        "properties": {
                            "advertiserCost": money_schema(),
                            "amount": {"type": ["number", "null"]},
                            "commissionAmount": {"type": ["number", "null"]},
                            "commissionGroupCode": {"type": ["string", "null"]},
                            "commissionGroupId": {"type": ["integer", "null"]},
                            "commissionGroupName": {"type": ["string", "null"]},
                            "trackedParts": {
                                "type": ["array", "null"],
                                "items": {
                                    "type": ["object", "null"],
                                    "properties": {
                                        "amount": {"type": ["number", "null"]},
                                        "code": {"type": ["string", "null"]},
                                        "currency": {"type": ["string", "null"]}
                                    }
                                }
                            }
                        }
                    }
                },
                "paidToPublisher": {"type": ["boolean", "null"]},
                "paymentId": {"type": ["integer", "null"]},
                "transactionQueryId": {"type": ["integer", "null"]},
                "originalSaleAmount": {"type": ["number", "null"]},
                "advertiserCost": money_schema()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReplicationMethod;
    use chrono::{DateTime, Utc};

    fn window() -> DateWindow {
        DateWindow {
            start: DateTime::parse_from_rfc3339("2024-01-15T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            end: DateTime::parse_from_rfc3339("2024-01-16T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_definition() {
        let stream = TransactionsStream;
        assert_eq!(stream.name(), "transactions");
        assert_eq!(stream.key_properties(), vec!["id", "transactionDate"]);
        assert_eq!(stream.replication_key(), Some("transactionDate"));
        assert_eq!(stream.replication_method(), ReplicationMethod::Incremental);
        assert!(stream.is_child());
    }

    #[test]
    fn test_query_params_with_window() {
        let config = TapConfig::from_json(r#"{"api_token": "t", "timezone": "UTC"}"#).unwrap();
        let params = TransactionsStream.query_params(&config, Some(&window()));

        let get = |k: &str| {
            params
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("startDate"), Some("2024-01-15T00:00:00"));
        assert_eq!(get("endDate"), Some("2024-01-16T00:00:00"));
        assert_eq!(get("timezone"), Some("UTC"));
        assert_eq!(get("dateType"), Some("transaction"));
        // This endpoint takes the token in the query string as well
        assert_eq!(get("accessToken"), Some("t"));
    }

    #[test]
    fn test_schema_covers_nested_parts() {
        let schema = TransactionsStream.schema();
        let props = schema["properties"].as_object().unwrap();
        assert!(props.len() >= 35);
        assert_eq!(
            schema["properties"]["transactionParts"]["items"]["properties"]["trackedParts"]
                ["items"]["properties"]["code"]["type"][0],
            "string"
        );
        assert_eq!(
            schema["properties"]["commissionAmount"]["properties"]["amount"]["type"][0],
            "number"
        );
    }
}
