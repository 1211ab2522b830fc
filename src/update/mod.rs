//! The self-update pipeline.
//!
//! One run of the updater checks the server for a newer version, downloads
//! and unpacks it over the installation when there is one, and then starts
//! the installed application no matter what happened before.
//!
//! # Components
//!
//! - [`VersionOracle`] - asks the server for the latest version string
//! - [`StreamingDownloader`] - streams the package with size and cancellation guards
//! - [`ChecksumVerifier`] - optional comparison against a published checksum
//! - [`SafeExtractor`] - two-pass, traversal-safe zip extraction
//! - [`SystemLauncher`] - starts the application without a shell
//! - [`UpdatePipeline`] - the state machine tying the phases together
//!
//! # Failure Policy
//!
//! No failure stops the application from launching. Every phase error is
//! logged, recorded as [`PipelinePhase::Failed`], and the run moves on to
//! [`PipelinePhase::Launching`].
//!
//! # Example
//!
//! ```rust,no_run
//! use arc_updater::config::{InstallLayout, UpdateConfig};
//! use arc_updater::update::{PipelineContext, UpdateOutcome, UpdatePipeline};
//!
//! # async fn example() {
//! let layout = InstallLayout::new(".");
//! let config = UpdateConfig::load_or_default(&layout.config_path());
//! let report = UpdatePipeline::new(config, layout, PipelineContext::headless()).run().await;
//!
//! if let UpdateOutcome::Applied { to, .. } = &report.outcome {
//!     println!("updated to {to}");
//! }
//! # }
//! ```

mod client;
mod context;
mod download;
mod extract;
mod launcher;
mod package;
mod pipeline;
mod verification;
mod version_check;

pub use client::build_http_client;
pub use context::{NoopObserver, PipelineContext, UpdateObserver};
pub use download::{DownloadProgress, DownloadSummary, PendingDownload, StreamingDownloader};
pub use extract::{ArchiveEntry, ExtractionReport, SafeExtractor};
pub use launcher::{LaunchOutcome, ProcessLauncher, SystemLauncher};
pub use package::PackageArchive;
pub use pipeline::{PipelinePhase, PipelineReport, Stage, UpdateOutcome, UpdatePipeline};
pub use verification::{ChecksumVerifier, parse_checksum_listing};
pub use version_check::{VersionCheck, VersionOracle, parse_version_response, read_version_marker};
