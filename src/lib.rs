//! # tap-awin
//!
//! A Singer tap for the Awin affiliate-marketing API.
//!
//! Extracts accounts, transactions, publishers and publisher reports and
//! emits them as Singer SCHEMA/RECORD/STATE messages on stdout, one JSON
//! object per line. Incremental streams are replicated in day-sized date
//! windows with per-account bookmarks, so interrupted runs resume where
//! they left off.
//!
//! ## Usage
//!
//! ```text
//! tap-awin --config config.json [--catalog catalog.json] [--state state.json]
//! tap-awin --config config.json --discover
//! tap-awin --about
//! ```

#![recursion_limit = "256"]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Tap configuration
pub mod config;

/// Awin API authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Response decoding and record extraction
pub mod decode;

/// Singer protocol messages and output
pub mod singer;

/// Bookmark state tracking
pub mod state;

/// Date window planning for incremental streams
pub mod windows;

/// Stream catalog and selection
pub mod catalog;

/// Stream definitions
pub mod streams;

/// Sync orchestration
pub mod engine;

/// Template interpolation for stream paths
pub mod template;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
