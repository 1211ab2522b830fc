use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The downloaded update package on disk.
///
/// Owned by the pipeline for the duration of one run. The download phase
/// writes it, the extract phase reads it, and the pipeline discards it once
/// the run is over, whatever the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageArchive {
    path: PathBuf,
}

impl PackageArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Deletes the package file, best-effort.
    ///
    /// A file that is already gone (extraction removes it on success) is not
    /// an error. Any other failure is logged and otherwise ignored.
    pub fn discard(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed update package {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove update package {}: {e}", self.path.display()),
        }
    }
}
