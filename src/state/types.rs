//! State types
//!
//! Singer-shaped state: a `bookmarks` map keyed by stream name, with a
//! per-account partition map inside each incremental stream. Extra keys from
//! targets that echo state back are preserved through `extra`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Complete tap state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Bookmarks per stream
    #[serde(default)]
    pub bookmarks: HashMap<String, StreamBookmark>,

    /// Stream currently being synced, for crash diagnostics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currently_syncing: Option<String>,

    /// Unknown top-level keys, passed through untouched
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Bookmark state for a single stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamBookmark {
    /// Stream-level replication key value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<String>,

    /// Per-account bookmarks, keyed by account id
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub partitions: HashMap<String, AccountBookmark>,
}

/// Bookmark for one account within a stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountBookmark {
    /// Replication key value for this account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<String>,

    /// End of the last completed date window, present only while an
    /// account's window pass is in flight. Cleared on completion so the
    /// lookback re-scan applies on the next run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_end: Option<String>,
}

impl State {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the bookmark for a stream, if any
    pub fn get_stream(&self, stream: &str) -> Option<&StreamBookmark> {
        self.bookmarks.get(stream)
    }

    /// Get or create the bookmark for a stream
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamBookmark {
        self.bookmarks.entry(stream.to_string()).or_default()
    }

    /// Bookmark value for an account within a stream
    pub fn account_bookmark(&self, stream: &str, account_id: &str) -> Option<&str> {
        self.bookmarks
            .get(stream)?
            .partitions
            .get(account_id)?
            .replication_key_value
            .as_deref()
    }

    /// Set the bookmark value for an account within a stream
    pub fn set_account_bookmark(&mut self, stream: &str, account_id: &str, value: String) {
        self.get_stream_mut(stream)
            .partitions
            .entry(account_id.to_string())
            .or_default()
            .replication_key_value = Some(value);
    }

    /// Advance an account bookmark, keeping the maximum of old and new.
    /// Bookmark values are ISO datetimes, so lexicographic comparison is
    /// chronological.
    pub fn advance_account_bookmark(&mut self, stream: &str, account_id: &str, value: &str) {
        let current = self.account_bookmark(stream, account_id);
        if current.map_or(true, |c| value > c) {
            self.set_account_bookmark(stream, account_id, value.to_string());
        }
    }

    /// Window checkpoint for an account, if a pass was interrupted
    pub fn window_checkpoint(&self, stream: &str, account_id: &str) -> Option<&str> {
        self.bookmarks
            .get(stream)?
            .partitions
            .get(account_id)?
            .window_end
            .as_deref()
    }

    /// Record the end of a completed window
    pub fn set_window_checkpoint(&mut self, stream: &str, account_id: &str, end: String) {
        self.get_stream_mut(stream)
            .partitions
            .entry(account_id.to_string())
            .or_default()
            .window_end = Some(end);
    }

    /// Drop the window checkpoint once an account's pass completes
    pub fn clear_window_checkpoint(&mut self, stream: &str, account_id: &str) {
        if let Some(stream_bookmark) = self.bookmarks.get_mut(stream) {
            if let Some(account) = stream_bookmark.partitions.get_mut(account_id) {
                account.window_end = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_state_serializes_minimal() {
        let state = State::new();
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value, json!({"bookmarks": {}}));
    }

    #[test]
    fn test_set_and_get_account_bookmark() {
        let mut state = State::new();
        state.set_account_bookmark("transactions", "12345", "2024-01-15T00:00:00".to_string());

        assert_eq!(
            state.account_bookmark("transactions", "12345"),
            Some("2024-01-15T00:00:00")
        );
        assert_eq!(state.account_bookmark("transactions", "99999"), None);
        assert_eq!(state.account_bookmark("publisher_report", "12345"), None);
    }

    #[test]
    fn test_advance_only_moves_forward() {
        let mut state = State::new();
        state.advance_account_bookmark("transactions", "1", "2024-01-15T00:00:00");
        state.advance_account_bookmark("transactions", "1", "2024-01-10T00:00:00");
        assert_eq!(
            state.account_bookmark("transactions", "1"),
            Some("2024-01-15T00:00:00")
        );

        state.advance_account_bookmark("transactions", "1", "2024-02-01T00:00:00");
        assert_eq!(
            state.account_bookmark("transactions", "1"),
            Some("2024-02-01T00:00:00")
        );
    }

    #[test]
    fn test_singer_shape_round_trip() {
        let json = r#"{
            "bookmarks": {
                "transactions": {
                    "partitions": {
                        "12345": {"replication_key_value": "2024-01-15T00:00:00"}
                    }
                }
            },
            "currently_syncing": "transactions"
        }"#;

        let state: State = serde_json::from_str(json).unwrap();
        assert_eq!(
            state.account_bookmark("transactions", "12345"),
            Some("2024-01-15T00:00:00")
        );
        assert_eq!(state.currently_syncing.as_deref(), Some("transactions"));

        let back = serde_json::to_value(&state).unwrap();
        assert_eq!(
            back["bookmarks"]["transactions"]["partitions"]["12345"]["replication_key_value"],
            "2024-01-15T00:00:00"
        );
    }

    #[test]
    fn test_window_checkpoint_lifecycle() {
        let mut state = State::new();
        assert_eq!(state.window_checkpoint("transactions", "1"), None);

        state.set_window_checkpoint("transactions", "1", "2024-01-16T00:00:00".to_string());
        assert_eq!(
            state.window_checkpoint("transactions", "1"),
            Some("2024-01-16T00:00:00")
        );

        state.clear_window_checkpoint("transactions", "1");
        assert_eq!(state.window_checkpoint("transactions", "1"), None);
        // Clearing an absent checkpoint is a no-op
        state.clear_window_checkpoint("transactions", "missing");
    }

    #[test]
    fn test_cleared_checkpoint_not_serialized() {
        let mut state = State::new();
        state.set_account_bookmark("transactions", "1", "2024-01-15T00:00:00".to_string());
        state.set_window_checkpoint("transactions", "1", "2024-01-16T00:00:00".to_string());
        state.clear_window_checkpoint("transactions", "1");

        let value = serde_json::to_value(&state).unwrap();
        assert!(value["bookmarks"]["transactions"]["partitions"]["1"]
            .get("window_end")
            .is_none());
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let json = r#"{"bookmarks": {}, "target_injected": {"x": 1}}"#;
        let state: State = serde_json::from_str(json).unwrap();
        let back = serde_json::to_value(&state).unwrap();
        assert_eq!(back["target_injected"]["x"], 1);
    }
}
