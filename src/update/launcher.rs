//! Starting the installed application.
//!
//! The launch step runs after every pipeline path. It never returns an error:
//! a missing or unstartable executable is reported as a [`LaunchOutcome`] and
//! logged, and the updater exits regardless.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{error, info};

/// What happened when the updater tried to start the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The process was started; the updater does not wait for it.
    Spawned {
        /// OS process id of the started application
        pid: u32,
    },
    /// No executable exists at the expected location.
    Missing {
        /// Where the executable was expected
        path: PathBuf,
    },
    /// The executable exists but could not be started.
    Failed {
        /// The executable that failed to start
        path: PathBuf,
        /// OS error text
        reason: String,
    },
}

impl LaunchOutcome {
    pub fn is_spawned(&self) -> bool {
        matches!(self, Self::Spawned { .. })
    }

    /// Process exit code for the updater itself.
    ///
    /// `0` when the application was started, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_spawned() { 0 } else { 1 }
    }
}

/// Starts an executable as an independent process.
///
/// Implementations must not panic and must not wait for the process to exit.
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, executable: &Path) -> LaunchOutcome;
}

/// Launches through the operating system, without a shell.
///
/// The path is passed to the OS as-is, so no quoting or shell expansion can
/// alter the command. The working directory is the executable's directory and
/// stdin is detached. On Windows the child is created as a detached process so
/// it outlives the updater's console.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, executable: &Path) -> LaunchOutcome {
        if !executable.is_file() {
            error!("Executable not found: {}", executable.display());
            return LaunchOutcome::Missing {
                path: executable.to_path_buf(),
            };
        }

        let mut command = Command::new(executable);
        command.stdin(Stdio::null());
        if let Some(dir) = executable.parent().filter(|d| !d.as_os_str().is_empty()) {
            command.current_dir(dir);
        }
        detach(&mut command);

        match command.spawn() {
            Ok(child) => {
                let pid = child.id();
                info!("Launched {} (pid {pid})", executable.display());
                LaunchOutcome::Spawned { pid }
            }
            Err(e) => {
                error!("Failed to launch {}: {e}", executable.display());
                LaunchOutcome::Failed {
                    path: executable.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(windows))]
fn detach(_command: &mut Command) {}
