//! Common types used throughout tap-awin
//!
//! Small enums shared across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Replication Method
// ============================================================================

/// How a stream is replicated from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationMethod {
    /// Fetch all data every run
    #[default]
    FullTable,
    /// Only fetch data newer than the saved bookmark
    Incremental,
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replication_method_serde() {
        let method: ReplicationMethod = serde_json::from_str("\"INCREMENTAL\"").unwrap();
        assert_eq!(method, ReplicationMethod::Incremental);

        let json = serde_json::to_string(&ReplicationMethod::FullTable).unwrap();
        assert_eq!(json, "\"FULL_TABLE\"");
    }

    #[test]
    fn test_backoff_type_default() {
        assert_eq!(BackoffType::default(), BackoffType::Exponential);
    }
}
