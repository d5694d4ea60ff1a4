use crate::{
    validate_url, ContentRequest, CycleState, Effect, Msg, OrchestrationError, OutputFormat,
    Phase, StatusNotice, FORMAT_ABORTED_MESSAGE,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not fit the current phase (late poller ticks, a second
/// submission mid-cycle) leave the state untouched and produce no effects.
pub fn update(mut state: CycleState, msg: Msg) -> (CycleState, Vec<Effect>) {
    let effects = match (state.phase(), msg) {
        (phase, Msg::Submitted(raw)) if !phase.is_busy() => {
            let mut effects = Vec::new();
            if state.begin_cycle(&raw) {
                effects.push(Effect::ClearError);
            }
            match validate_url(&raw) {
                Ok(url) => {
                    state.set_phase(Phase::FetchingMetadata);
                    effects.push(Effect::FetchMetadata {
                        url: url.to_string(),
                    });
                }
                Err(err) => effects.extend(fail(&mut state, err)),
            }
            effects
        }
        (Phase::FetchingMetadata, Msg::MetadataLoaded(metadata)) => {
            let is_video = metadata.is_video;
            state.set_metadata(metadata.clone());
            state.set_phase(Phase::AwaitingFormat);
            let mut effects = vec![Effect::ShowMetadata(metadata)];
            if is_video {
                effects.push(Effect::PromptFormat {
                    preselected: state.preselected_format(),
                });
            } else {
                effects.extend(begin_download(&mut state, OutputFormat::default()));
            }
            effects
        }
        (Phase::FetchingMetadata, Msg::MetadataFailed(err)) => fail(&mut state, err),
        (Phase::AwaitingFormat, Msg::FormatConfirmed(format)) => {
            begin_download(&mut state, format)
        }
        (Phase::AwaitingFormat, Msg::FormatAborted) => fail(
            &mut state,
            OrchestrationError::cancelled(FORMAT_ABORTED_MESSAGE),
        ),
        (Phase::Downloading, Msg::ProgressObserved(progress)) if state.poller_running() => {
            let mut effects = Vec::new();
            if let Some(percent) = state.observe_progress(progress) {
                effects.push(Effect::UpdateProgress(percent));
            }
            effects
        }
        (Phase::Downloading, Msg::PollerCompleted) if state.poller_running() => {
            state.stop_polling();
            show_completion(&mut state)
        }
        (Phase::Downloading, Msg::JobSucceeded(artifact)) if !state.delivering() => {
            let mut effects = Vec::new();
            if state.stop_polling() {
                effects.push(Effect::StopPoller);
            }
            effects.extend(show_completion(&mut state));
            state.set_delivering(true);
            effects.push(Effect::Deliver(artifact));
            effects
        }
        (Phase::Downloading, Msg::JobFailed(err)) if !state.delivering() => fail(&mut state, err),
        (Phase::Downloading, Msg::DeliveryCompleted { saved }) if state.delivering() => {
            state.set_delivering(false);
            state.set_phase(Phase::Delivered);
            let notice = if saved {
                StatusNotice::Delivered
            } else {
                StatusNotice::SaveCancelled
            };
            vec![Effect::ShowStatus(notice)]
        }
        (Phase::Downloading, Msg::DeliveryFailed(err)) if state.delivering() => {
            fail(&mut state, err)
        }
        _ => Vec::new(),
    };

    (state, effects)
}

fn begin_download(state: &mut CycleState, format: OutputFormat) -> Vec<Effect> {
    let Some(url) = state.url().map(ToOwned::to_owned) else {
        return Vec::new();
    };
    state.resolve_format(format);
    state.set_phase(Phase::Downloading);
    state.start_polling();
    vec![
        Effect::UpdateProgress(0),
        Effect::ShowStatus(StatusNotice::Starting),
        Effect::StartJob(ContentRequest { url, format }),
    ]
}

fn show_completion(state: &mut CycleState) -> Vec<Effect> {
    match state.mark_completion_shown() {
        Some(true) => vec![
            Effect::UpdateProgress(100),
            Effect::ShowStatus(StatusNotice::Completed),
        ],
        Some(false) => vec![Effect::ShowStatus(StatusNotice::Completed)],
        None => Vec::new(),
    }
}

fn fail(state: &mut CycleState, err: OrchestrationError) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(3);
    if state.stop_polling() {
        effects.push(Effect::StopPoller);
    }
    effects.push(Effect::ShowError(err.message.clone()));
    effects.push(Effect::HideProgress);
    state.fail(err);
    effects
}
