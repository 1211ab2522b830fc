//! Core types shared by every phase of the updater.
//!
//! - [`error`] - typed errors for download, extraction and the pipeline
//! - [`version`] - the opaque [`VersionString`] token

pub mod error;
pub mod version;

pub use error::{DownloadError, ExtractError, UpdateError};
pub use version::VersionString;
