//! Command-line interface for the updater.
//!
//! The updater has no subcommands: it is started in place of the application,
//! runs one update pipeline and then hands over to the application.
//!
//! # Usage
//!
//! ```bash
//! # Update the installation in the current directory
//! arc-updater
//!
//! # Update another installation, with debug logs and no progress bar
//! arc-updater --install-dir "C:/Games/ArcCompanion" --verbose --no-progress
//! ```
//!
//! # Exit Codes
//!
//! - `0` - the application was started
//! - `1` - the application executable is missing or could not be started
//!
//! Update failures do not change the exit code; they are only logged.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{InstallLayout, UpdateConfig};
use crate::constants::{DEFAULT_EXECUTABLE_NAME, DEFAULT_VERSION_FILE_NAME};
use crate::update::{PipelineContext, UpdateOutcome, UpdatePipeline};
use crate::utils::ConsoleObserver;

/// Updates the installed application, then launches it.
#[derive(Parser, Debug)]
#[command(
    name = "arc-updater",
    about = "Self-updater for ARC Companion - checks for updates, applies them, launches the app",
    version,
    author
)]
pub struct Cli {
    /// Installation root; defaults to the current directory.
    #[arg(long, value_name = "DIR", env = "ARC_UPDATER_INSTALL_DIR")]
    install_dir: Option<PathBuf>,

    /// Settings file (JSON, or TOML with a `.toml` extension).
    ///
    /// Defaults to `config.json` inside the installation root. A missing or
    /// malformed file falls back to built-in defaults.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Executable started after the update, relative to the installation root.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_EXECUTABLE_NAME)]
    executable: String,

    /// Version marker file, relative to the installation root.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_VERSION_FILE_NAME)]
    version_file: String,

    /// Disable the progress display.
    ///
    /// Also available as `ARC_UPDATER_NO_PROGRESS=1`.
    #[arg(long)]
    no_progress: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Default log filter for the selected verbosity; `RUST_LOG` takes precedence.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "arc_updater=debug,info"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    /// Resolves the installation layout from the flags.
    ///
    /// # Errors
    ///
    /// Fails only when no install dir is given and the current directory
    /// cannot be determined.
    pub fn layout(&self) -> Result<InstallLayout> {
        let root = match &self.install_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };
        Ok(InstallLayout::new(root)
            .with_executable(self.executable.as_str())
            .with_version_file(self.version_file.as_str()))
    }

    /// Runs one update pipeline and returns the process exit code.
    ///
    /// `cancel` aborts a running download; the application is still launched.
    ///
    /// # Errors
    ///
    /// Returns an error only when the installation layout cannot be resolved.
    pub async fn execute(self, cancel: CancellationToken) -> Result<i32> {
        let layout = self.layout()?;
        let config_path = self.config.clone().unwrap_or_else(|| layout.config_path());
        debug!("Using installation root {}", layout.root().display());

        let config = UpdateConfig::load_or_default(&config_path);
        let observer = Arc::new(ConsoleObserver::new(self.no_progress));
        let context = PipelineContext::new(observer).with_cancellation(cancel);

        let report = UpdatePipeline::new(config, layout, context).run().await;
        match &report.outcome {
            UpdateOutcome::Applied { to, files_written, .. } => {
                info!("Installed version {to} ({files_written} files updated)");
            }
            UpdateOutcome::NoUpdate => debug!("Installation left unchanged"),
            UpdateOutcome::Failed { phase, .. } => debug!("Update stopped during {phase}"),
        }

        Ok(report.exit_code())
    }
}
