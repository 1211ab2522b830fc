//! Global constants used throughout the updater.
//!
//! File names, endpoint defaults and stream parameters live here so the
//! configuration layer, the CLI and the tests agree on the same values.

use std::time::Duration;

/// Default update server base URL.
pub const DEFAULT_UPDATE_SERVER: &str = "https://ghostworld073.pythonanywhere.com";

/// Default endpoint (relative to the server) answering `["<version>", ...]`.
pub const DEFAULT_VERSION_ENDPOINT: &str = "latest_arc_companion";

/// Default endpoint (relative to the server) streaming the update package.
pub const DEFAULT_DOWNLOAD_ENDPOINT: &str = "download_latest_arc_companion";

/// Default package size cap in megabytes.
pub const DEFAULT_MAX_DOWNLOAD_SIZE_MB: u64 = 500;

/// Default connect/read timeout in seconds.
pub const DEFAULT_CONNECTION_TIMEOUT_SECONDS: u64 = 30;

/// Size of each chunk written to the package sink (1 KiB).
///
/// Progress is reported and the digest is fed once per chunk.
pub const DOWNLOAD_CHUNK_SIZE: usize = 1024;

/// Bytes per megabyte, for the size cap and progress text.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Executable started after every run.
pub const DEFAULT_EXECUTABLE_NAME: &str = "arc_companion.exe";

/// Plain-text marker holding the installed version.
pub const DEFAULT_VERSION_FILE_NAME: &str = "arc_companion_version.txt";

/// Name of the downloaded package inside the installation root.
pub const PACKAGE_FILE_NAME: &str = "arc_companion_update.zip";

/// Settings document looked up in the installation root.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable that hides the console progress bar.
pub const NO_PROGRESS_ENV: &str = "ARC_UPDATER_NO_PROGRESS";

/// Refresh interval of the console progress bar.
pub const PROGRESS_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
