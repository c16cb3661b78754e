//! HTTP layer: client with retry/backoff and rate limiting

pub mod client;
pub mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
