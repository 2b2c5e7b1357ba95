//! Outbound HTTP client construction.

use crate::error::CoreError;
use std::time::Duration;

/// Upper bound on every outbound call made by the tooling.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a `reqwest` client with the fixed request timeout and a user agent
/// identifying the calling tool.
pub fn build_client(user_agent: &str) -> Result<reqwest::Client, CoreError> {
    Ok(reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(user_agent)
        .build()?)
}
