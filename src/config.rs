//! Tap configuration
//!
//! The tap is configured with a JSON document (`--config config.json`),
//! deserialized with serde defaulting for every optional field.

use crate::error::{Error, Result};
use crate::types::BackoffType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

/// Default Awin API base URL
pub const DEFAULT_API_URL: &str = "https://api.awin.com";

// ============================================================================
// Tap Config
// ============================================================================

/// Complete tap configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// API token used to authenticate against the Awin API
    pub api_token: String,

    /// Earliest transaction date to sync (RFC 3339)
    #[serde(default = "default_start_date")]
    pub start_date: String,

    /// Timezone passed through to the API as a query parameter
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Number of days to look back and re-sync on every run
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    /// Optional User-Agent header
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Override the API base URL (used in tests)
    #[serde(default)]
    pub api_url: Option<String>,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,
}

fn default_start_date() -> String {
    "2016-01-01T00:00:00Z".to_string()
}

fn default_timezone() -> String {
    "Europe/London".to_string()
}

fn default_lookback_days() -> i64 {
    30
}

impl TapConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
        Self::from_json(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TapConfig = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_token.is_empty() {
            return Err(Error::missing_field("api_token"));
        }
        if self.start_date().is_err() {
            return Err(Error::invalid_value(
                "start_date",
                format!("not an RFC 3339 datetime: {}", self.start_date),
            ));
        }
        if self.lookback_days < 0 {
            return Err(Error::invalid_value(
                "lookback_days",
                "must not be negative",
            ));
        }
        if let Some(ref api_url) = self.api_url {
            url::Url::parse(api_url)
                .map_err(|e| Error::invalid_value("api_url", e.to_string()))?;
        }
        Ok(())
    }

    /// Parsed start date
    pub fn start_date(&self) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.start_date)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::invalid_value("start_date", e.to_string()))
    }

    /// API base URL, honoring the `api_url` override
    pub fn base_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// JSON schema describing the accepted config, emitted by `--about`
    pub fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "api_token": {
                    "type": "string",
                    "secret": true,
                    "description": "The token to authenticate against the API service"
                },
                "start_date": {
                    "type": "string",
                    "format": "date-time",
                    "default": default_start_date(),
                    "description": "The earliest transaction date to sync"
                },
                "timezone": {
                    "type": "string",
                    "default": default_timezone(),
                    "description": "Timezone to use"
                },
                "lookback_days": {
                    "type": "integer",
                    "default": default_lookback_days(),
                    "description": "Number of days to lookback to re-sync transactions"
                },
                "user_agent": {
                    "type": "string",
                    "description": "User-Agent header sent with every request"
                },
                "api_url": {
                    "type": "string",
                    "format": "uri",
                    "description": "Override the Awin API base URL"
                }
            },
            "required": ["api_token"]
        })
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffSettings,

    /// Requests per second limit
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffSettings::default(),
            requests_per_second: default_rps(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    10
}

fn default_rps() -> u32 {
    10
}

/// Backoff settings for retries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffSettings {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

// The Awin API throttles aggressively; start at 4s and double.
fn default_initial_ms() -> u64 {
    4000
}

fn default_max_ms() -> u64 {
    60000
}
