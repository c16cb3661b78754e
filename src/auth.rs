//! Authentication against the Awin API
//!
//! Awin uses a static API token, sent as a bearer `Authorization` header.
//! The transaction and report endpoints additionally accept it as the
//! `accessToken` query parameter; the streams that need that add it to
//! their own query params so the secret stays out of URLs everywhere else.

use reqwest::RequestBuilder;

/// Query parameter name carrying the API token, for the endpoints that
/// take it in the query string
pub const ACCESS_TOKEN_PARAM: &str = "accessToken";

/// Applies the Awin API token to outgoing requests
#[derive(Clone)]
pub struct Authenticator {
    token: String,
}

impl Authenticator {
    /// Create an authenticator for the given API token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Apply authentication to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.token)
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}
