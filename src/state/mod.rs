//! Bookmark state tracking and persistence

pub mod manager;
pub mod types;

pub use manager::StateManager;
pub use types::{AccountBookmark, State, StreamBookmark};
