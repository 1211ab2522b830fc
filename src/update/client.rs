use reqwest::Client;
use tracing::debug;

use crate::config::UpdateConfig;
use crate::constants::USER_AGENT;
use crate::core::UpdateError;

/// Builds the HTTP client shared by every network phase of a run.
///
/// The configured timeout bounds both connecting and each individual read, so
/// a slow but steady download is never cut off while a stalled one is.
/// Certificate verification stays at reqwest's default; there is no switch to
/// turn it off.
///
/// # Errors
///
/// Returns [`UpdateError::Network`] if the TLS backend cannot be initialised.
pub fn build_http_client(config: &UpdateConfig) -> Result<Client, UpdateError> {
    let timeout = config.connection_timeout();
    debug!("Building HTTP client with {}s connect/read timeout", timeout.as_secs());

    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .build()
        .map_err(|e| UpdateError::Network {
            operation: "HTTP client setup".to_string(),
            reason: e.to_string(),
        })
}
