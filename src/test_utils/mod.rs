//! Test utilities for arc-updater
//!
//! Helpers shared by unit tests and the integration suite:
//!
//! - [`init_test_logging`] - one-time tracing setup for tests
//! - [`ZipEntry`], [`write_zip`], [`zip_bytes`] - in-process archive fixtures
//! - [`RecordingLauncher`] - a launcher that records instead of spawning
//! - [`RecordingObserver`] - an observer that records every pipeline event
//!
//! Available to integration tests through the `test-utils` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use arc_updater::test_utils::{ZipEntry, zip_bytes};
//!
//! let package = zip_bytes(&[
//!     ZipEntry::file("arc_companion.exe", b"binary"),
//!     ZipEntry::file("../../evil.bin", b"payload"),
//! ]);
//! assert!(!package.is_empty());
//! ```

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::update::{DownloadProgress, LaunchOutcome, PipelinePhase, ProcessLauncher, UpdateObserver};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests run without logging.
///
/// ```bash
/// RUST_LOG=arc_updater=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// One entry of a fixture archive.
///
/// Names are written verbatim, so hostile paths such as `../../evil.bin` or
/// `/etc/passwd` end up in the archive exactly as given.
#[derive(Debug, Clone)]
pub struct ZipEntry {
    name: String,
    contents: Vec<u8>,
    is_dir: bool,
    mode: Option<u32>,
}

impl ZipEntry {
    pub fn file(name: &str, contents: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            contents: contents.to_vec(),
            is_dir: false,
            mode: None,
        }
    }

    pub fn dir(name: &str) -> Self {
        Self {
            name: name.to_string(),
            contents: Vec::new(),
            is_dir: true,
            mode: None,
        }
    }

    /// Records Unix permission bits for the entry.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// Builds a deflated zip archive in memory.
pub fn zip_bytes(entries: &[ZipEntry]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in entries {
        let mut options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        if let Some(mode) = entry.mode {
            options = options.unix_permissions(mode);
        }

        if entry.is_dir {
            writer.add_directory(entry.name.as_str(), options).unwrap();
        } else {
            writer.start_file(entry.name.as_str(), options).unwrap();
            writer.write_all(&entry.contents).unwrap();
        }
    }

    writer.finish().unwrap().into_inner()
}

/// Writes a zip archive with `entries` to `path`.
pub fn write_zip(path: &Path, entries: &[ZipEntry]) {
    std::fs::write(path, zip_bytes(entries)).unwrap();
}

/// Launcher that records requested paths instead of starting processes.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingLauncher {
    launched: Arc<Mutex<Vec<PathBuf>>>,
}

impl RecordingLauncher {
    pub fn launched(&self) -> Vec<PathBuf> {
        self.launched.lock().unwrap().clone()
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn launch(&self, executable: &Path) -> LaunchOutcome {
        self.launched.lock().unwrap().push(executable.to_path_buf());
        if executable.is_file() {
            LaunchOutcome::Spawned { pid: 0 }
        } else {
            LaunchOutcome::Missing {
                path: executable.to_path_buf(),
            }
        }
    }
}

/// Observer that records every event it receives.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    phases: Mutex<Vec<PipelinePhase>>,
    progress: Mutex<Vec<DownloadProgress>>,
    finished: AtomicBool,
}

impl RecordingObserver {
    pub fn phases(&self) -> Vec<PipelinePhase> {
        self.phases.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<DownloadProgress> {
        self.progress.lock().unwrap().clone()
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl UpdateObserver for RecordingObserver {
    fn on_phase(&self, phase: &PipelinePhase) {
        self.phases.lock().unwrap().push(phase.clone());
    }

    fn on_progress(&self, progress: DownloadProgress) {
        self.progress.lock().unwrap().push(progress);
    }

    fn on_finished(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}
