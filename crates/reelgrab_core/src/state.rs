use crate::display::MetadataView;
use crate::view_model::CycleViewModel;
use crate::{ContentMetadata, JobProgress, OrchestrationError, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    FetchingMetadata,
    AwaitingFormat,
    Downloading,
    Delivered,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Delivered | Phase::Failed)
    }

    /// Phases in which a cycle is underway and a new submission must be refused.
    pub fn is_busy(self) -> bool {
        !matches!(self, Phase::Idle | Phase::Delivered | Phase::Failed)
    }
}

/// State of one orchestration cycle. A new submission replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleState {
    phase: Phase,
    preselected_format: OutputFormat,
    url: Option<String>,
    metadata: Option<ContentMetadata>,
    format: Option<OutputFormat>,
    progress: Option<JobProgress>,
    poller_running: bool,
    completion_shown: bool,
    delivering: bool,
    error: Option<OrchestrationError>,
    dirty: bool,
}

impl CycleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the selector starts on when the content is a video.
    pub fn with_preselected_format(format: OutputFormat) -> Self {
        Self {
            preselected_format: format,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn error(&self) -> Option<&OrchestrationError> {
        self.error.as_ref()
    }

    pub fn preselected_format(&self) -> OutputFormat {
        self.preselected_format
    }

    pub fn view(&self) -> CycleViewModel {
        CycleViewModel {
            phase: self.phase,
            url: self.url.clone(),
            metadata: self.metadata.as_ref().map(MetadataView::from),
            format: self.format,
            progress: self.progress.map(JobProgress::percent),
            poller_running: self.poller_running,
            error: self.error.as_ref().map(|err| err.message.clone()),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn begin_cycle(&mut self, url: &str) -> bool {
        let had_error = self.error.is_some();
        *self = Self {
            phase: Phase::Validating,
            preselected_format: self.preselected_format,
            url: Some(url.to_string()),
            dirty: true,
            ..Self::default()
        };
        had_error
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.dirty = true;
    }

    pub(crate) fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub(crate) fn set_metadata(&mut self, metadata: ContentMetadata) {
        self.metadata = Some(metadata);
        self.dirty = true;
    }

    pub(crate) fn resolve_format(&mut self, format: OutputFormat) {
        self.format = Some(format);
        self.dirty = true;
    }

    pub(crate) fn start_polling(&mut self) {
        self.progress = Some(JobProgress::default());
        self.poller_running = true;
        self.completion_shown = false;
        self.dirty = true;
    }

    pub(crate) fn poller_running(&self) -> bool {
        self.poller_running
    }

    /// Marks the poller stopped; returns whether it was running.
    pub(crate) fn stop_polling(&mut self) -> bool {
        std::mem::take(&mut self.poller_running)
    }

    /// Records an observation and returns the percent to display if it changed.
    /// Values below what is already shown are ignored.
    pub(crate) fn observe_progress(&mut self, observed: JobProgress) -> Option<u8> {
        let shown = self.progress.unwrap_or_default();
        if observed <= shown {
            return None;
        }
        self.progress = Some(observed);
        self.dirty = true;
        Some(observed.percent())
    }

    /// Forces the indicator to completion once. `None` if that already happened,
    /// otherwise whether the displayed percent had to move.
    pub(crate) fn mark_completion_shown(&mut self) -> Option<bool> {
        if self.completion_shown {
            return None;
        }
        self.completion_shown = true;
        let moved = self.progress != Some(JobProgress::COMPLETE);
        self.progress = Some(JobProgress::COMPLETE);
        self.dirty = true;
        Some(moved)
    }

    pub(crate) fn delivering(&self) -> bool {
        self.delivering
    }

    pub(crate) fn set_delivering(&mut self, delivering: bool) {
        self.delivering = delivering;
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, error: OrchestrationError) {
        self.phase = Phase::Failed;
        self.progress = None;
        self.delivering = false;
        self.error = Some(error);
        self.dirty = true;
    }
}
