use reqwest::Client;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::UpdateConfig;
use crate::core::{UpdateError, VersionString};

/// Result of comparing the installed version with the server's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    /// The server reports exactly the installed version.
    UpToDate,
    /// The server reports a different version.
    UpdateAvailable {
        /// Version reported by the server
        remote: VersionString,
    },
    /// The server could not be asked or gave an unusable answer.
    ///
    /// Treated exactly like [`VersionCheck::UpToDate`] by the pipeline.
    Unknown {
        /// Why the check failed
        reason: String,
    },
}

impl VersionCheck {
    /// Whether an update should be downloaded.
    pub fn is_update_available(&self) -> bool {
        matches!(self, Self::UpdateAvailable { .. })
    }
}

/// Asks the update server for the latest version.
///
/// The oracle fails closed: any network error, timeout, non-success status or
/// malformed answer means "no update", so a broken server never holds up
/// starting the installed application.
///
/// # Wire Format
///
/// `GET {update_server}/{version_endpoint}` must answer `200 OK` with a JSON
/// array whose first element is the version string:
///
/// ```json
/// ["1.1.0"]
/// ```
///
/// # Examples
///
/// ```rust,no_run
/// use arc_updater::config::UpdateConfig;
/// use arc_updater::core::VersionString;
/// use arc_updater::update::{VersionOracle, build_http_client};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = UpdateConfig::default();
/// let oracle = VersionOracle::new(build_http_client(&config)?, &config);
///
/// if oracle.is_update_available(&VersionString::new("1.0.0")).await {
///     println!("update available");
/// }
/// # Ok(())
/// # }
/// ```
pub struct VersionOracle {
    client: Client,
    url: String,
    timeout: Duration,
}

impl VersionOracle {
    /// Creates an oracle for the version endpoint of `config`.
    pub fn new(client: Client, config: &UpdateConfig) -> Self {
        Self {
            client,
            url: config.version_url(),
            timeout: config.connection_timeout(),
        }
    }

    /// Fetches the latest version string from the server.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::Network`] for transport failures, non-success
    /// statuses and response bodies that are not a JSON array starting with a
    /// non-empty string.
    pub async fn latest_version(&self) -> Result<VersionString, UpdateError> {
        debug!("Checking for updates at {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| network_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(network_error(format!("HTTP {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| network_error(format!("malformed response: {e}")))?;

        parse_version_response(&body)
            .ok_or_else(|| network_error(format!("unexpected response shape: {body}")))
    }

    /// Compares the installed version against the server's.
    pub async fn check(&self, local: &VersionString) -> VersionCheck {
        match self.latest_version().await {
            Ok(remote) if &remote == local => {
                info!("No new version available.");
                VersionCheck::UpToDate
            }
            Ok(remote) => {
                info!("New version available: {remote}");
                VersionCheck::UpdateAvailable { remote }
            }
            Err(e) => {
                warn!("Error checking for updates: {e}");
                VersionCheck::Unknown { reason: e.to_string() }
            }
        }
    }

    /// Returns true iff the server reports a version different from `local`.
    pub async fn is_update_available(&self, local: &VersionString) -> bool {
        self.check(local).await.is_update_available()
    }
}

/// Extracts the version from a `[version, ...]` response body.
///
/// The token is kept verbatim; only an empty string is rejected.
pub fn parse_version_response(body: &Value) -> Option<VersionString> {
    let first = body.as_array()?.first()?.as_str()?;
    let version = VersionString::from_raw(first);
    (!version.is_empty()).then_some(version)
}

/// Reads the installed version from the plain-text marker file.
///
/// # Errors
///
/// Returns [`UpdateError::MissingLocalState`] when the marker is absent,
/// unreadable, or holds nothing but whitespace.
pub async fn read_version_marker(path: &Path) -> Result<VersionString, UpdateError> {
    let missing = || UpdateError::MissingLocalState {
        what: "version file".to_string(),
        path: path.to_path_buf(),
    };

    let content = fs::read_to_string(path).await.map_err(|e| {
        warn!("Version file not found: {} ({e})", path.display());
        missing()
    })?;

    let version = VersionString::new(content);
    if version.is_empty() {
        warn!("Version file is empty: {}", path.display());
        return Err(missing());
    }

    debug!("Installed version: {version}");
    Ok(version)
}

fn network_error(reason: String) -> UpdateError {
    UpdateError::Network {
        operation: "version check".to_string(),
        reason,
    }
}
