//! arc-updater - self-updater for the ARC Companion desktop application
//!
//! The updater is started in place of the application. It asks the update
//! server for the latest version, downloads and unpacks the new package over
//! the installation when the versions differ, and then launches the
//! application. A failure at any step is logged and the installed version is
//! launched anyway: a broken update never keeps the user from the app.
//!
//! # Pipeline
//!
//! ```text
//! CheckingVersion ──> NoUpdate ───────────────────────┐
//!        │                                            v
//!        └──> Downloading ──> Extracting ──────> Launching
//!                  │               │                  ^
//!                  └───────────────┴──> Failed ───────┘
//! ```
//!
//! # Modules
//!
//! - [`cli`] - command-line flags and the top-level run
//! - [`config`] - settings document and installation layout
//! - [`constants`] - default endpoints, file names and stream parameters
//! - [`core`] - error types and the version token
//! - [`update`] - version check, download, extraction, launch and the pipeline
//! - [`utils`] - archive path validation and console progress
//!
//! # Server Protocol
//!
//! - `GET {update_server}/latest_arc_companion` answers `["<version>", ...]`
//! - `GET {update_server}/download_latest_arc_companion` streams the zip package
//!
//! # Configuration
//!
//! `config.json` next to the application (all keys optional):
//!
//! ```json
//! {
//!   "update_server": "https://ghostworld073.pythonanywhere.com",
//!   "max_download_size_mb": 500,
//!   "enable_hash_verification": true,
//!   "connection_timeout_seconds": 30
//! }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod update;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
