use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::download::DownloadProgress;
use super::pipeline::PipelinePhase;

/// Receives pipeline events on the foreground task.
///
/// The pipeline calls these methods only from the task driving
/// [`UpdatePipeline::run`](super::UpdatePipeline::run); background phases
/// hand their progress over a channel first. Implementations should return
/// quickly.
pub trait UpdateObserver: Send + Sync {
    /// A new phase was entered.
    fn on_phase(&self, _phase: &PipelinePhase) {}

    /// The download advanced.
    fn on_progress(&self, _progress: DownloadProgress) {}

    /// The run is over; tear down any UI before the process exits.
    fn on_finished(&self) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl UpdateObserver for NoopObserver {}

/// State shared between the pipeline phases and whoever started the run.
///
/// Carries the observer and the cancellation token explicitly instead of
/// through globals. Cloning is cheap and clones share the same token.
#[derive(Clone)]
pub struct PipelineContext {
    observer: Arc<dyn UpdateObserver>,
    cancel: CancellationToken,
}

impl PipelineContext {
    pub fn new(observer: Arc<dyn UpdateObserver>) -> Self {
        Self {
            observer,
            cancel: CancellationToken::new(),
        }
    }

    /// Context without any observer, for tests and non-interactive runs.
    pub fn headless() -> Self {
        Self::new(Arc::new(NoopObserver))
    }

    /// Replaces the cancellation token, e.g. with one wired to Ctrl-C.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn observer(&self) -> &dyn UpdateObserver {
        self.observer.as_ref()
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Requests cancellation of the running phase.
    ///
    /// A running download stops at the next chunk boundary; extraction that
    /// has already started is allowed to finish. The launch step still runs.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
