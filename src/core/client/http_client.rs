use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the metrics adapter.
///
/// Only the connect phase is bounded; whole-request deadlines are left to
/// the caller.
pub fn build_http_client() -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

    debug!("HTTP client initialized");
    Ok(client)
}
