use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::client::build_http_client;
use super::context::PipelineContext;
use super::download::{DownloadProgress, DownloadSummary, StreamingDownloader};
use super::extract::{ExtractionReport, SafeExtractor};
use super::launcher::{LaunchOutcome, ProcessLauncher, SystemLauncher};
use super::package::PackageArchive;
use super::verification::ChecksumVerifier;
use super::version_check::{VersionCheck, VersionOracle, read_version_marker};
use crate::config::{InstallLayout, UpdateConfig};
use crate::constants::PACKAGE_FILE_NAME;
use crate::core::{DownloadError, UpdateError, VersionString};

/// A phase that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CheckingVersion,
    Downloading,
    Extracting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CheckingVersion => "version check",
            Self::Downloading => "download",
            Self::Extracting => "extraction",
        };
        f.write_str(name)
    }
}

/// States of the update state machine.
///
/// ```text
/// CheckingVersion ─┬─> NoUpdate ────────────────────────────┐
///                  └─> Downloading ─┬─> Extracting ─┬───────┤
///                                   │               │       v
///                                   └───────────────┴─> Failed ─> Launching
/// ```
///
/// A version check failure that leaves no local version to compare also goes
/// through `Failed`. Every run ends in `Launching`, exactly once.
#[derive(Debug, Clone)]
pub enum PipelinePhase {
    CheckingVersion,
    NoUpdate,
    Downloading,
    Extracting,
    Launching,
    Failed {
        /// The phase that failed
        phase: Stage,
        /// Why it failed
        cause: Arc<UpdateError>,
    },
}

impl PipelinePhase {
    /// Status line shown by observers.
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::CheckingVersion => "Checking for updates...",
            Self::NoUpdate => "No updates available.",
            Self::Downloading => "Updating...",
            Self::Extracting => "Extracting update...",
            Self::Launching => "Launching...",
            Self::Failed { .. } => "Update failed, launching installed version...",
        }
    }
}

impl PartialEq for PipelinePhase {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Failed { phase: a, .. }, Self::Failed { phase: b, .. }) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

/// What the update part of a run achieved.
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    /// Nothing was downloaded: the versions match or the server gave no usable answer.
    NoUpdate,
    /// A new version was downloaded and extracted over the installation.
    Applied {
        from: VersionString,
        to: VersionString,
        /// Size of the downloaded package
        bytes: u64,
        /// Package digest, when hashing was enabled
        sha256: Option<String>,
        files_written: usize,
    },
    /// A phase failed; the installed version is launched unchanged or partially updated.
    Failed { phase: Stage, cause: Arc<UpdateError> },
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Full record of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Every phase entered, in order
    pub history: Vec<PipelinePhase>,
    pub outcome: UpdateOutcome,
    pub launch: LaunchOutcome,
}

impl PipelineReport {
    pub fn exit_code(&self) -> i32 {
        self.launch.exit_code()
    }
}

/// Drives one update run from version check to launch.
///
/// Each phase returns a `Result`; a failure is recorded as
/// [`PipelinePhase::Failed`] and the run continues straight to the launch
/// step. Download and extraction each run once as a background task:
///
/// - the download on a tokio task, with progress forwarded to the observer
///   over a channel while the foreground awaits the task
/// - the extraction on a blocking worker
///
/// Phase N+1 starts only after phase N's task has finished, and the observer
/// is only ever called from the task driving [`UpdatePipeline::run`].
///
/// # Examples
///
/// ```rust,no_run
/// use arc_updater::config::{InstallLayout, UpdateConfig};
/// use arc_updater::update::{PipelineContext, UpdatePipeline};
///
/// # async fn example() {
/// let layout = InstallLayout::new("C:/Games/ArcCompanion");
/// let config = UpdateConfig::load_or_default(&layout.config_path());
///
/// let report = UpdatePipeline::new(config, layout, PipelineContext::headless())
///     .run()
///     .await;
/// std::process::exit(report.exit_code());
/// # }
/// ```
pub struct UpdatePipeline<L = SystemLauncher> {
    config: UpdateConfig,
    layout: InstallLayout,
    context: PipelineContext,
    launcher: L,
}

impl UpdatePipeline<SystemLauncher> {
    pub fn new(config: UpdateConfig, layout: InstallLayout, context: PipelineContext) -> Self {
        Self {
            config,
            layout,
            context,
            launcher: SystemLauncher,
        }
    }
}

impl<L: ProcessLauncher> UpdatePipeline<L> {
    /// Replaces the launcher used for the final step.
    pub fn with_launcher<M: ProcessLauncher>(self, launcher: M) -> UpdatePipeline<M> {
        UpdatePipeline {
            config: self.config,
            layout: self.layout,
            context: self.context,
            launcher,
        }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Runs the whole state machine. Never fails; the report says what happened.
    pub async fn run(&self) -> PipelineReport {
        let mut history = Vec::new();

        let outcome = self.update(&mut history).await;
        self.package().discard();

        self.enter(&mut history, PipelinePhase::Launching);
        let launch = self.launcher.launch(&self.layout.executable_path());
        self.context.observer().on_finished();

        PipelineReport {
            history,
            outcome,
            launch,
        }
    }

    async fn update(&self, history: &mut Vec<PipelinePhase>) -> UpdateOutcome {
        self.enter(history, PipelinePhase::CheckingVersion);

        let local = match read_version_marker(&self.layout.version_file_path()).await {
            Ok(version) => version,
            Err(e) => return self.fail(history, Stage::CheckingVersion, e),
        };
        let client = match build_http_client(&self.config) {
            Ok(client) => client,
            Err(e) => return self.fail(history, Stage::CheckingVersion, e),
        };

        let remote = match VersionOracle::new(client.clone(), &self.config).check(&local).await {
            VersionCheck::UpdateAvailable { remote } => remote,
            VersionCheck::UpToDate | VersionCheck::Unknown { .. } => {
                self.enter(history, PipelinePhase::NoUpdate);
                return UpdateOutcome::NoUpdate;
            }
        };

        self.enter(history, PipelinePhase::Downloading);
        let summary = match self.download(client).await {
            Ok(summary) => summary,
            Err(e) => return self.fail(history, Stage::Downloading, e),
        };

        self.enter(history, PipelinePhase::Extracting);
        let report = match self.extract().await {
            Ok(report) => report,
            Err(e) => return self.fail(history, Stage::Extracting, e),
        };

        info!("Updated from {local} to {remote}");
        UpdateOutcome::Applied {
            from: local,
            to: remote,
            bytes: summary.bytes_written,
            sha256: summary.sha256,
            files_written: report.files_written,
        }
    }

    async fn download(&self, client: Client) -> Result<DownloadSummary, UpdateError> {
        if self.context.is_cancelled() {
            return Err(UpdateError::Cancelled);
        }

        let downloader = StreamingDownloader::new(client.clone(), self.config.hash_verification_enabled)
            .with_cancellation(self.context.cancel_token().clone());
        let url = self.config.download_url();
        let max_bytes = self.config.max_package_size_bytes();
        let package_path = self.layout.package_path();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut task = tokio::spawn(fetch_package(downloader, url, max_bytes, package_path, tx));

        let joined = loop {
            tokio::select! {
                joined = &mut task => break joined,
                Some(progress) = rx.recv() => self.context.observer().on_progress(progress),
            }
        };
        while let Ok(progress) = rx.try_recv() {
            self.context.observer().on_progress(progress);
        }

        let summary = joined.map_err(|e| UpdateError::Task {
            phase: Stage::Downloading.to_string(),
            reason: e.to_string(),
        })??;

        if let Some(checksum_url) = self.config.checksum_url() {
            self.verify_checksum(&client, &checksum_url, &summary).await?;
        }

        Ok(summary)
    }

    async fn verify_checksum(
        &self,
        client: &Client,
        checksum_url: &str,
        summary: &DownloadSummary,
    ) -> Result<(), UpdateError> {
        let actual = match &summary.sha256 {
            Some(digest) => digest.clone(),
            None => ChecksumVerifier::compute_sha256(self.package().path()).await?,
        };

        match ChecksumVerifier::fetch_expected_checksum(client, checksum_url, PACKAGE_FILE_NAME).await? {
            Some(expected) => ChecksumVerifier::verify_digest(&actual, &expected)?,
            None => warn!("Server published no checksum for {PACKAGE_FILE_NAME}, skipping verification"),
        }
        Ok(())
    }

    async fn extract(&self) -> Result<ExtractionReport, UpdateError> {
        if self.context.is_cancelled() {
            return Err(UpdateError::Cancelled);
        }

        let archive = self.layout.package_path();
        let root = self.layout.root().to_path_buf();
        let report = tokio::task::spawn_blocking(move || SafeExtractor::extract_safely(&archive, &root))
            .await
            .map_err(|e| UpdateError::Task {
                phase: Stage::Extracting.to_string(),
                reason: e.to_string(),
            })??;

        Ok(report)
    }

    fn package(&self) -> PackageArchive {
        PackageArchive::new(self.layout.package_path())
    }

    fn enter(&self, history: &mut Vec<PipelinePhase>, phase: PipelinePhase) {
        debug!("Entering phase {phase:?}");
        self.context.observer().on_phase(&phase);
        history.push(phase);
    }

    fn fail(&self, history: &mut Vec<PipelinePhase>, phase: Stage, cause: UpdateError) -> UpdateOutcome {
        error!("Update failed during {phase}: {cause}");
        let cause = Arc::new(cause);
        self.enter(
            history,
            PipelinePhase::Failed {
                phase,
                cause: Arc::clone(&cause),
            },
        );
        UpdateOutcome::Failed { phase, cause }
    }
}

async fn fetch_package(
    downloader: StreamingDownloader,
    url: String,
    max_bytes: u64,
    package_path: PathBuf,
    progress: mpsc::UnboundedSender<DownloadProgress>,
) -> Result<DownloadSummary, DownloadError> {
    let pending = downloader.open(&url, max_bytes).await?;
    let mut file = tokio::fs::File::create(&package_path).await?;
    pending
        .write_to(&mut file, |event| {
            // The receiver only goes away once the pipeline stops listening.
            let _ = progress.send(event);
        })
        .await
}
