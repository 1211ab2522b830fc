//! Shared fixtures for the integration suite.
//!
//! [`TestInstall`] is a throwaway installation directory paired with a mock
//! update server. Tests serve a version and a package, run the pipeline, and
//! assert on the report and the files left behind.

use arc_updater::config::{InstallLayout, UpdateConfig};
use arc_updater::core::UpdateError;
use arc_updater::test_utils::{RecordingLauncher, init_test_logging};
use arc_updater::update::{PipelineContext, PipelinePhase, PipelineReport, Stage, UpdatePipeline};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const VERSION_PATH: &str = "/latest_arc_companion";
pub const DOWNLOAD_PATH: &str = "/download_latest_arc_companion";
pub const CHECKSUM_PATH: &str = "/sha256sums.txt";

pub struct TestInstall {
    _temp: TempDir,
    pub layout: InstallLayout,
    pub server: MockServer,
    pub launcher: RecordingLauncher,
}

impl TestInstall {
    /// Installation at version `local` with an old executable in place.
    pub async fn new(local: &str) -> Self {
        let install = Self::without_marker().await;
        std::fs::write(install.layout.version_file_path(), local).unwrap();
        install
    }

    /// Installation whose version marker is missing.
    pub async fn without_marker() -> Self {
        init_test_logging(None);

        let temp = TempDir::new().unwrap();
        let layout = InstallLayout::new(temp.path().join("install"));
        std::fs::create_dir_all(layout.root()).unwrap();
        std::fs::write(layout.executable_path(), b"old binary").unwrap();

        Self {
            _temp: temp,
            layout,
            server: MockServer::start().await,
            launcher: RecordingLauncher::default(),
        }
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    /// Directory holding the installation; traversal payloads would land here.
    pub fn outside(&self) -> PathBuf {
        self.root().parent().unwrap().to_path_buf()
    }

    pub fn config(&self) -> UpdateConfig {
        UpdateConfig {
            server_base_url: self.server.uri(),
            connection_timeout_seconds: 5,
            ..UpdateConfig::default()
        }
    }

    pub async fn serve_version(&self, version: &str) {
        Mock::given(method("GET"))
            .and(path(VERSION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([version])))
            .mount(&self.server)
            .await;
    }

    /// Serves `body` as the package and expects it to be requested `times` times.
    pub async fn serve_package(&self, body: Vec<u8>, times: u64) {
        Mock::given(method("GET"))
            .and(path(DOWNLOAD_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    pub async fn run(&self, config: UpdateConfig, context: PipelineContext) -> PipelineReport {
        UpdatePipeline::new(config, self.layout.clone(), context)
            .with_launcher(self.launcher.clone())
            .run()
            .await
    }

    pub async fn run_default(&self) -> PipelineReport {
        self.run(self.config(), PipelineContext::headless()).await
    }

    pub fn read(&self, relative: &str) -> Vec<u8> {
        std::fs::read(self.root().join(relative)).unwrap()
    }
}

/// A `Failed` phase for history comparisons; phases compare by stage only.
pub fn failed_at(phase: Stage) -> PipelinePhase {
    PipelinePhase::Failed {
        phase,
        cause: Arc::new(UpdateError::Cancelled),
    }
}

/// Every regular file under `dir`, relative to it, sorted.
pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                found.push(path.strip_prefix(dir).unwrap().to_path_buf());
            }
        }
    }
    found.sort();
    found
}
