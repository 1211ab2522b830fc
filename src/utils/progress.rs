//! Console progress display for update runs.
//!
//! [`ConsoleObserver`] renders the pipeline on the terminal with an
//! `indicatif` bar: a spinner with the phase status while the version check
//! and extraction run, and a byte counter while the package downloads.
//!
//! # Environment Variables
//!
//! - `ARC_UPDATER_NO_PROGRESS`: set to any value to hide the display
//!
//! Hidden bars still accept every call, so callers never branch on whether
//! progress is shown.

use indicatif::{ProgressBar, ProgressStyle};

use crate::constants::{NO_PROGRESS_ENV, PROGRESS_TICK_INTERVAL};
use crate::update::{DownloadProgress, PipelinePhase, UpdateObserver};

/// Whether progress display is disabled through the environment.
pub fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some()
}

/// Terminal observer for [`UpdatePipeline`](crate::update::UpdatePipeline).
pub struct ConsoleObserver {
    bar: ProgressBar,
}

impl ConsoleObserver {
    /// Creates the observer; `hidden` (or the environment switch) suppresses output.
    pub fn new(hidden: bool) -> Self {
        let bar = if hidden || is_progress_disabled() {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(PROGRESS_TICK_INTERVAL);
            bar
        };
        Self { bar }
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }
}

impl UpdateObserver for ConsoleObserver {
    fn on_phase(&self, phase: &PipelinePhase) {
        if matches!(phase, PipelinePhase::Extracting | PipelinePhase::Launching) {
            self.bar.set_style(spinner_style());
        }
        self.bar.set_message(phase.status_text());
    }

    fn on_progress(&self, progress: DownloadProgress) {
        match progress.bytes_total {
            Some(total) if self.bar.length() != Some(total) => {
                self.bar.set_style(download_style());
                self.bar.set_length(total);
            }
            _ => {}
        }
        self.bar.set_position(progress.bytes_downloaded);
        self.bar.set_message(progress.describe());
    }

    fn on_finished(&self) {
        self.bar.finish_and_clear();
    }
}

fn download_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸━")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}
