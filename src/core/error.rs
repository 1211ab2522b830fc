//! Error types for the update pipeline
//!
//! Every phase of an update run reports failure through one of the typed errors
//! in this module. None of them are fatal to the updater: the pipeline logs the
//! error, records a `Failed` phase, and proceeds to launch whatever executable is
//! currently installed.
//!
//! # Error Categories
//!
//! - [`DownloadError`] - failures of the streaming package download
//! - [`ExtractError`] - failures while validating or unpacking the package archive
//! - [`UpdateError`] - the pipeline-level taxonomy every phase error folds into
//!
//! Phase errors convert into [`UpdateError`] with `?`:
//!
//! - [`DownloadError::Network`] → [`UpdateError::Network`]
//! - [`DownloadError::TooLarge`] → [`UpdateError::PackageTooLarge`]
//! - [`ExtractError`] → [`UpdateError::Archive`]
//!
//! # Examples
//!
//! ```rust
//! use arc_updater::core::{DownloadError, UpdateError};
//!
//! let error: UpdateError = DownloadError::TooLarge { declared: 2048, limit: 1024 }.into();
//! assert!(matches!(error, UpdateError::PackageTooLarge { declared: 2048, limit: 1024 }));
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the streaming downloader.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Connection, timeout, TLS or HTTP status failure
    #[error("Network error during {operation}: {reason}")]
    Network {
        /// The network operation that failed
        operation: String,
        /// Reason for the network failure
        reason: String,
    },

    /// The package is larger than the configured cap.
    ///
    /// Raised before any body data is read when `content-length` declares an
    /// oversized package, and mid-stream when the body outgrows the cap.
    #[error("Update package too large: {declared} bytes (max: {limit})")]
    TooLarge {
        /// Declared (or streamed so far) size in bytes
        declared: u64,
        /// Configured maximum package size in bytes
        limit: u64,
    },

    /// The downloaded package does not match the published checksum
    #[error("Checksum mismatch for update package: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The expected checksum value
        expected: String,
        /// The actual checksum that was computed
        actual: String,
    },

    /// The download was cancelled through the pipeline context
    #[error("Download cancelled after {downloaded} bytes")]
    Cancelled {
        /// Bytes written before the cancellation was observed
        downloaded: u64,
    },

    /// Writing to the sink failed
    #[error("Failed to write update package: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Builds a [`DownloadError::Network`] from any displayable cause.
    pub fn network(operation: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Network {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors produced by the safe extractor.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The archive container is corrupt or not a zip file
    #[error("Invalid update archive {path}: {reason}")]
    BadArchive {
        /// Path of the archive that could not be read
        path: PathBuf,
        /// Reason reported by the archive reader
        reason: String,
    },

    /// An entry would resolve outside the extraction root
    #[error("Archive contains unsafe file path: {entry}")]
    UnsafePath {
        /// The entry path as declared inside the archive
        entry: String,
    },

    /// Writing an entry to disk failed
    #[error("Failed to extract {path}: {source}")]
    Io {
        /// Destination path being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Pipeline-level error taxonomy.
///
/// Every phase failure is converted into one of these variants at the phase
/// boundary and recorded in the pipeline history before the launch step.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// Connect, timeout or HTTP status failure
    #[error("Network error during {operation}: {reason}")]
    Network {
        /// The network operation that failed
        operation: String,
        /// Reason for the network failure
        reason: String,
    },

    /// Declared or streamed package size exceeds the configured cap
    #[error("Update package too large: {declared} bytes (max: {limit})")]
    PackageTooLarge {
        /// Declared (or streamed so far) size in bytes
        declared: u64,
        /// Configured maximum package size in bytes
        limit: u64,
    },

    /// Corrupt archive container or unsafe entry path
    #[error(transparent)]
    Archive(#[from] ExtractError),

    /// Absent version marker or other required local file
    #[error("Missing local state: {what} ({path})")]
    MissingLocalState {
        /// Which piece of local state is missing
        what: String,
        /// Where it was expected
        path: PathBuf,
    },

    /// Published checksum does not match the downloaded package
    #[error("Checksum mismatch for update package: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The expected checksum value
        expected: String,
        /// The actual checksum that was computed
        actual: String,
    },

    /// The run was cancelled by the observer
    #[error("Update cancelled")]
    Cancelled,

    /// Local file system failure outside of extraction
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A background phase task panicked or was aborted
    #[error("Background task for {phase} failed: {reason}")]
    Task {
        /// Name of the phase whose task failed
        phase: String,
        /// Join error reported by the runtime
        reason: String,
    },
}

impl From<DownloadError> for UpdateError {
    fn from(error: DownloadError) -> Self {
        match error {
            DownloadError::Network { operation, reason } => Self::Network { operation, reason },
            DownloadError::TooLarge { declared, limit } => Self::PackageTooLarge { declared, limit },
            DownloadError::ChecksumMismatch { expected, actual } => {
                Self::ChecksumMismatch { expected, actual }
            }
            DownloadError::Cancelled { .. } => Self::Cancelled,
            DownloadError::Io(e) => Self::Io(e),
        }
    }
}
