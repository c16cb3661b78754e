//! Sync orchestration

pub mod sync;

pub use sync::{SyncRunner, SyncStats};
