use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_CONFIG_FILE_NAME, DEFAULT_EXECUTABLE_NAME, DEFAULT_VERSION_FILE_NAME,
    PACKAGE_FILE_NAME,
};

/// Files of an installation, all resolved under a single root.
///
/// The update archive is extracted directly over [`InstallLayout::root`]; the
/// package is downloaded next to it and removed once the run is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
    executable: String,
    version_file: String,
}

impl InstallLayout {
    /// Layout with the default file names.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            executable: DEFAULT_EXECUTABLE_NAME.to_string(),
            version_file: DEFAULT_VERSION_FILE_NAME.to_string(),
        }
    }

    /// Overrides the executable file name.
    pub fn with_executable(mut self, name: impl Into<String>) -> Self {
        self.executable = name.into();
        self
    }

    /// Overrides the version marker file name.
    pub fn with_version_file(mut self, name: impl Into<String>) -> Self {
        self.version_file = name.into();
        self
    }

    /// Installation root; also the extraction destination.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Executable started at the end of every run.
    pub fn executable_path(&self) -> PathBuf {
        self.root.join(&self.executable)
    }

    /// Plain-text version marker.
    pub fn version_file_path(&self) -> PathBuf {
        self.root.join(&self.version_file)
    }

    /// Where the update package is downloaded to.
    pub fn package_path(&self) -> PathBuf {
        self.root.join(PACKAGE_FILE_NAME)
    }

    /// Default settings document location.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(DEFAULT_CONFIG_FILE_NAME)
    }
}
