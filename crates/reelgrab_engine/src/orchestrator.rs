//! Async driver for one orchestration cycle.
//!
//! Transitions live in [`reelgrab_core::update`]; this module executes the
//! effects it returns against the injected collaborators and feeds results
//! back as messages. Everything happens on the calling task except the
//! progress poller, whose handle this driver owns for the whole cycle.
use std::collections::VecDeque;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn};
use reelgrab_core::{
    update, Artifact, ContentRequest, CycleState, Effect, MetadataView, Msg, OrchestrationError,
    OutputFormat, Phase, StatusNotice,
};
use tokio::sync::mpsc;

use crate::poller::{spawn_poller, PollerEvent, PollerHandle, PollerOutcome};
use crate::{
    ArtifactDelivery, ClientError, ClientSettings, MediaService, ProgressSource, SaveAction,
    SaveOutcome,
};

/// Rendering surface. Implementations must not block.
pub trait UiSink: Send + Sync {
    fn show_metadata(&self, view: &MetadataView);
    fn update_progress(&self, percent: u8);
    fn hide_progress(&self);
    fn show_status(&self, notice: StatusNotice);
    fn show_error(&self, message: &str);
    fn clear_error(&self);
}

/// Format selector. Resolves once the user confirms; `None` when they back out.
#[async_trait::async_trait]
pub trait FormatPrompt: Send + Sync {
    async fn choose_format(&self, preselected: OutputFormat) -> Option<OutputFormat>;
}

pub struct Collaborators {
    pub service: Arc<dyn MediaService>,
    pub progress: Arc<dyn ProgressSource>,
    pub ui: Arc<dyn UiSink>,
    pub prompt: Arc<dyn FormatPrompt>,
    pub saver: Arc<dyn SaveAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub phase: Phase,
    pub error: Option<OrchestrationError>,
    pub saved_to: Option<PathBuf>,
    /// `None` when the cycle never reached the download.
    pub poller: Option<PollerOutcome>,
}

type JobFuture = Pin<Box<dyn Future<Output = Result<Artifact, ClientError>> + Send>>;

enum Wake {
    Job(Result<Artifact, ClientError>),
    Poller(PollerEvent),
}

/// Per-cycle resources. Dropped (and the poller with it) when the cycle ends.
struct Cycle {
    job: Option<JobFuture>,
    poller: Option<PollerHandle>,
    poller_outcome: Option<PollerOutcome>,
    poll_tx: mpsc::UnboundedSender<PollerEvent>,
    poll_rx: mpsc::UnboundedReceiver<PollerEvent>,
    saved_to: Option<PathBuf>,
}

pub struct Orchestrator {
    collaborators: Collaborators,
    delivery: ArtifactDelivery,
    settings: ClientSettings,
}

impl Orchestrator {
    pub fn new(settings: ClientSettings, collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            delivery: ArtifactDelivery::new(),
            settings,
        }
    }

    pub fn with_delivery(mut self, delivery: ArtifactDelivery) -> Self {
        self.delivery = delivery;
        self
    }

    /// Runs one cycle for `raw_url` through delivery or failure.
    pub async fn run_cycle(&self, raw_url: &str) -> CycleReport {
        let (poll_tx, poll_rx) = mpsc::unbounded_channel();
        let mut cycle = Cycle {
            job: None,
            poller: None,
            poller_outcome: None,
            poll_tx,
            poll_rx,
            saved_to: None,
        };
        let mut state = CycleState::with_preselected_format(self.settings.preselected_format);
        let mut inbox = VecDeque::from([Msg::Submitted(raw_url.to_string())]);

        loop {
            while let Some(msg) = inbox.pop_front() {
                let before = state.phase();
                let (next, effects) = update(state, msg);
                state = next;
                if state.phase() != before {
                    engine_debug!("Cycle phase {:?} -> {:?}", before, state.phase());
                }
                for effect in effects {
                    if let Some(reply) = self.execute(effect, &mut cycle).await {
                        inbox.push_back(reply);
                    }
                }
            }

            if state.phase().is_terminal() {
                break;
            }

            let Some(job) = cycle.job.as_mut() else {
                // Only reachable if a transition forgot to schedule work.
                engine_warn!("Cycle stalled in phase {:?}", state.phase());
                break;
            };
            let wake = tokio::select! {
                result = job => Wake::Job(result),
                Some(event) = cycle.poll_rx.recv() => Wake::Poller(event),
            };
            inbox.push_back(match wake {
                Wake::Job(result) => {
                    cycle.job = None;
                    match result {
                        Ok(artifact) => Msg::JobSucceeded(artifact),
                        Err(err) => {
                            engine_warn!("Job failed: {}", err);
                            Msg::JobFailed(err.into())
                        }
                    }
                }
                Wake::Poller(PollerEvent::Progress(progress)) => Msg::ProgressObserved(progress),
                Wake::Poller(PollerEvent::Completed) => Msg::PollerCompleted,
            });
        }

        if let Some(handle) = cycle.poller.take() {
            let outcome = if handle.is_finished() {
                handle.join().await
            } else {
                handle.stop().await
            };
            cycle.poller_outcome = Some(outcome);
        }

        engine_info!("Cycle ended phase={:?}", state.phase());
        CycleReport {
            phase: state.phase(),
            error: state.error().cloned(),
            saved_to: cycle.saved_to,
            poller: cycle.poller_outcome,
        }
    }

    async fn execute(&self, effect: Effect, cycle: &mut Cycle) -> Option<Msg> {
        let ui = &self.collaborators.ui;
        match effect {
            Effect::FetchMetadata { url } => {
                let msg = match self.collaborators.service.fetch_metadata(&url).await {
                    Ok(metadata) => Msg::MetadataLoaded(metadata),
                    Err(err) => {
                        engine_warn!("Metadata query failed: {}", err);
                        Msg::MetadataFailed(err.into())
                    }
                };
                Some(msg)
            }
            Effect::ShowMetadata(metadata) => {
                ui.show_metadata(&MetadataView::from(&metadata));
                None
            }
            Effect::PromptFormat { preselected } => {
                let choice = self.collaborators.prompt.choose_format(preselected).await;
                Some(choice.map_or(Msg::FormatAborted, Msg::FormatConfirmed))
            }
            Effect::StartJob(request) => {
                self.start_job(request, cycle);
                None
            }
            Effect::StopPoller => {
                if let Some(handle) = cycle.poller.take() {
                    cycle.poller_outcome = Some(handle.stop().await);
                }
                None
            }
            Effect::Deliver(artifact) => Some(self.deliver(artifact, cycle).await),
            Effect::UpdateProgress(percent) => {
                ui.update_progress(percent);
                None
            }
            Effect::HideProgress => {
                ui.hide_progress();
                None
            }
            Effect::ShowStatus(notice) => {
                ui.show_status(notice);
                None
            }
            Effect::ShowError(message) => {
                ui.show_error(&message);
                None
            }
            Effect::ClearError => {
                ui.clear_error();
                None
            }
        }
    }

    fn start_job(&self, request: ContentRequest, cycle: &mut Cycle) {
        let service = Arc::clone(&self.collaborators.service);
        cycle.job = Some(Box::pin(async move { service.start_job(&request).await }));
        cycle.poller = Some(spawn_poller(
            Arc::clone(&self.collaborators.progress),
            self.settings.poll_interval,
            cycle.poll_tx.clone(),
        ));
    }

    async fn deliver(&self, artifact: Artifact, cycle: &mut Cycle) -> Msg {
        let delivery = self.delivery.clone();
        let saver = Arc::clone(&self.collaborators.saver);
        let joined =
            tokio::task::spawn_blocking(move || delivery.deliver(&artifact, saver.as_ref())).await;
        let result = match joined {
            Ok(result) => result.map_err(OrchestrationError::from),
            Err(err) => Err(OrchestrationError::delivery(err.to_string())),
        };
        match result {
            Ok(SaveOutcome::Saved(path)) => {
                cycle.saved_to = Some(path);
                Msg::DeliveryCompleted { saved: true }
            }
            Ok(SaveOutcome::Cancelled) => Msg::DeliveryCompleted { saved: false },
            Err(err) => {
                engine_warn!("Delivery failed: {}", err);
                Msg::DeliveryFailed(err)
            }
        }
    }
}
