use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use super::parser::parse_config;
use crate::constants::{
    BYTES_PER_MB, DEFAULT_CONNECTION_TIMEOUT_SECONDS, DEFAULT_DOWNLOAD_ENDPOINT,
    DEFAULT_MAX_DOWNLOAD_SIZE_MB, DEFAULT_UPDATE_SERVER, DEFAULT_VERSION_ENDPOINT,
};

/// Settings controlling where updates come from and how they are guarded.
///
/// Loaded once at process start. Every key is optional: missing keys take the
/// built-in default, unknown keys are ignored, and a document that cannot be
/// read or parsed is replaced by [`UpdateConfig::default`] as a whole.
///
/// # Document Keys
///
/// ```json
/// {
///   "update_server": "https://ghostworld073.pythonanywhere.com",
///   "max_download_size_mb": 500,
///   "enable_hash_verification": true,
///   "connection_timeout_seconds": 30
/// }
/// ```
///
/// `version_endpoint`, `download_endpoint` and `checksum_endpoint` may also be
/// set; the first two default to the paths the update server has always used,
/// the last one is off unless configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Base URL of the update server.
    #[serde(rename = "update_server")]
    pub server_base_url: String,

    /// Package size cap in megabytes.
    pub max_download_size_mb: u64,

    /// Whether a SHA-256 digest is computed while downloading.
    #[serde(rename = "enable_hash_verification")]
    pub hash_verification_enabled: bool,

    /// Connect and read timeout for every request, in seconds.
    pub connection_timeout_seconds: u64,

    /// Endpoint answering with a JSON array whose first element is the latest version.
    pub version_endpoint: String,

    /// Endpoint streaming the update package.
    pub download_endpoint: String,

    /// Optional endpoint serving a `sha256sum`-style listing for the package.
    ///
    /// When set, the downloaded package must match the published digest; the
    /// file is hashed after the download if streaming hashing is disabled.
    /// Unset, the digest is only logged.
    pub checksum_endpoint: Option<String>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            server_base_url: DEFAULT_UPDATE_SERVER.to_string(),
            max_download_size_mb: DEFAULT_MAX_DOWNLOAD_SIZE_MB,
            hash_verification_enabled: true,
            connection_timeout_seconds: DEFAULT_CONNECTION_TIMEOUT_SECONDS,
            version_endpoint: DEFAULT_VERSION_ENDPOINT.to_string(),
            download_endpoint: DEFAULT_DOWNLOAD_ENDPOINT.to_string(),
            checksum_endpoint: None,
        }
    }
}

impl UpdateConfig {
    /// Load settings from `path`, falling back to defaults on any problem.
    ///
    /// A missing file is normal and logged at debug level; an unreadable or
    /// malformed one is logged as a warning. This never fails.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Self::default();
        }

        match parse_config::<Self>(path) {
            Ok(config) => {
                debug!("Loaded settings from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Error loading config: {e:#}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Package size cap in bytes.
    pub fn max_package_size_bytes(&self) -> u64 {
        self.max_download_size_mb.saturating_mul(BYTES_PER_MB)
    }

    /// Connect/read timeout as a [`Duration`].
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_seconds)
    }

    /// Full URL of the version endpoint.
    pub fn version_url(&self) -> String {
        self.endpoint_url(&self.version_endpoint)
    }

    /// Full URL of the download endpoint.
    pub fn download_url(&self) -> String {
        self.endpoint_url(&self.download_endpoint)
    }

    /// Full URL of the checksum endpoint, when one is configured.
    pub fn checksum_url(&self) -> Option<String> {
        self.checksum_endpoint.as_deref().map(|endpoint| self.endpoint_url(endpoint))
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.server_base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}
