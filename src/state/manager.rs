//! State manager
//!
//! Holds the tap state behind a lock and persists it with atomic writes.
//! The state file mirrors what gets emitted in STATE messages, so a run can
//! resume either from `--state state.json` or from a target's echoed state.

use super::types::State;
use crate::error::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// State manager for persisting and loading bookmark state
#[derive(Debug)]
pub struct StateManager {
    /// Path to the state file (empty for in-memory mode)
    path: PathBuf,
    state: Arc<RwLock<State>>,
}

impl StateManager {
    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            state: Arc::new(RwLock::new(State::new())),
        }
    }

    /// Create a state manager from a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
            serde_json::from_str(&contents)
                .map_err(|e| Error::state(format!("Failed to parse state file: {e}")))?
        } else {
            State::new()
        };

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Create an in-memory state manager seeded from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let state: State = serde_json::from_str(json)
            .map_err(|e| Error::state(format!("Failed to parse state JSON: {e}")))?;

        Ok(Self {
            path: PathBuf::new(),
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Save current state to file
    pub async fn save(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }

        let state = self.state.read().await;
        let contents = serde_json::to_string_pretty(&*state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        Ok(())
    }

    /// Get a read lock on the current state
    pub async fn state(&self) -> tokio::sync::RwLockReadGuard<'_, State> {
        self.state.read().await
    }

    /// Get a write lock on the current state
    pub async fn state_mut(&self) -> tokio::sync::RwLockWriteGuard<'_, State> {
        self.state.write().await
    }

    /// Bookmark value for an account within a stream
    pub async fn account_bookmark(&self, stream: &str, account_id: &str) -> Option<String> {
        let state = self.state.read().await;
        state
            .account_bookmark(stream, account_id)
            .map(ToString::to_string)
    }

    /// Advance an account bookmark, keeping the maximum
    pub async fn advance_account_bookmark(&self, stream: &str, account_id: &str, value: &str) {
        let mut state = self.state.write().await;
        state.advance_account_bookmark(stream, account_id, value);
    }

    /// Window checkpoint for an account, if a pass was interrupted
    pub async fn window_checkpoint(&self, stream: &str, account_id: &str) -> Option<String> {
        let state = self.state.read().await;
        state
            .window_checkpoint(stream, account_id)
            .map(ToString::to_string)
    }

    /// Record the end of a completed window
    pub async fn set_window_checkpoint(&self, stream: &str, account_id: &str, end: String) {
        let mut state = self.state.write().await;
        state.set_window_checkpoint(stream, account_id, end);
    }

    /// Drop the window checkpoint once an account's pass completes
    pub async fn clear_window_checkpoint(&self, stream: &str, account_id: &str) {
        let mut state = self.state.write().await;
        state.clear_window_checkpoint(stream, account_id);
    }

    /// Mark which stream is currently syncing
    pub async fn set_currently_syncing(&self, stream: Option<&str>) {
        let mut state = self.state.write().await;
        state.currently_syncing = stream.map(ToString::to_string);
    }

    /// Snapshot the state as a JSON value for a STATE message
    pub async fn snapshot(&self) -> Result<Value> {
        let state = self.state.read().await;
        serde_json::to_value(&*state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_roundtrip() {
        let manager = StateManager::in_memory();
        assert!(manager.is_in_memory());

        manager
            .advance_account_bookmark("transactions", "1", "2024-01-15T00:00:00")
            .await;

        assert_eq!(
            manager.account_bookmark("transactions", "1").await,
            Some("2024-01-15T00:00:00".to_string())
        );

        // In-memory save is a no-op
        manager.save().await.unwrap();
    }

    #[tokio::test]
    async fn test_from_json() {
        let manager = StateManager::from_json(
            r#"{"bookmarks": {"transactions": {"partitions": {"5": {"replication_key_value": "2024-03-01T00:00:00"}}}}}"#,
        )
        .unwrap();

        assert_eq!(
            manager.account_bookmark("transactions", "5").await,
            Some("2024-03-01T00:00:00".to_string())
        );
    }

    #[tokio::test]
    async fn test_from_json_invalid() {
        assert!(StateManager::from_json("not json").is_err());
    }

    #[tokio::test]
    async fn test_file_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let manager = StateManager::from_file(&path).unwrap();
        manager
            .advance_account_bookmark("transactions", "42", "2024-06-01T00:00:00")
            .await;
        manager.save().await.unwrap();

        // New manager reads the persisted file
        let reloaded = StateManager::from_file(&path).unwrap();
        assert_eq!(
            reloaded.account_bookmark("transactions", "42").await,
            Some("2024-06-01T00:00:00".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let manager = StateManager::from_file(dir.path().join("missing.json")).unwrap();
        assert!(manager.state().await.bookmarks.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_shape() {
        let manager = StateManager::in_memory();
        manager
            .advance_account_bookmark("transactions", "1", "2024-01-15T00:00:00")
            .await;
        manager.set_currently_syncing(Some("transactions")).await;

        let snapshot = manager.snapshot().await.unwrap();
        assert_eq!(
            snapshot["bookmarks"]["transactions"]["partitions"]["1"]["replication_key_value"],
            "2024-01-15T00:00:00"
        );
        assert_eq!(snapshot["currently_syncing"], "transactions");
    }
}
