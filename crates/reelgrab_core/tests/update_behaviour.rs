use std::sync::Once;

use pretty_assertions::assert_eq;
use reelgrab_core::{
    update, Artifact, ContentMetadata, ContentRequest, CycleState, Effect, ErrorKind,
    JobProgress, Msg, OrchestrationError, OutputFormat, Phase, StatusNotice, EMPTY_URL_MESSAGE,
    FORMAT_ABORTED_MESSAGE, SUGGESTED_NAME,
};

const URL: &str = "https://www.instagram.com/reel/Cx1/";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn metadata(is_video: bool) -> ContentMetadata {
    ContentMetadata {
        title: "Sunset".into(),
        uploader: "ana".into(),
        upload_date: "20230115".into(),
        duration_seconds: is_video.then_some(125),
        view_count: 1234567,
        like_count: 321,
        comment_count: 0,
        is_video,
        description: None,
        thumbnail: None,
    }
}

fn apply(state: CycleState, msgs: Vec<Msg>) -> (CycleState, Vec<Effect>) {
    let mut state = state;
    let mut all = Vec::new();
    for msg in msgs {
        let (next, effects) = update(state, msg);
        state = next;
        all.extend(effects);
    }
    (state, all)
}

fn downloading(format: OutputFormat) -> CycleState {
    let (state, _) = apply(
        CycleState::new(),
        vec![
            Msg::Submitted(URL.into()),
            Msg::MetadataLoaded(metadata(true)),
            Msg::FormatConfirmed(format),
        ],
    );
    assert_eq!(state.phase(), Phase::Downloading);
    state
}

#[test]
fn blank_submission_fails_without_network_effects() {
    init_logging();
    for raw in ["", "   ", "\n\t"] {
        let (state, effects) = update(CycleState::new(), Msg::Submitted(raw.into()));

        assert_eq!(state.phase(), Phase::Failed);
        assert_eq!(state.error().map(|e| e.kind), Some(ErrorKind::Validation));
        assert_eq!(
            effects,
            vec![
                Effect::ShowError(EMPTY_URL_MESSAGE.into()),
                Effect::HideProgress
            ]
        );
    }
}

#[test]
fn submission_requests_metadata_for_raw_url() {
    init_logging();
    let (state, effects) = update(CycleState::new(), Msg::Submitted(URL.into()));

    assert_eq!(state.phase(), Phase::FetchingMetadata);
    assert_eq!(effects, vec![Effect::FetchMetadata { url: URL.into() }]);
}

#[test]
fn metadata_failure_presents_message_verbatim() {
    init_logging();
    let (state, effects) = apply(
        CycleState::new(),
        vec![
            Msg::Submitted(URL.into()),
            Msg::MetadataFailed(OrchestrationError::remote("URL de Instagram inválida")),
        ],
    );

    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(
        state.view().error.as_deref(),
        Some("URL de Instagram inválida")
    );
    assert_eq!(
        &effects[1..],
        &[
            Effect::ShowError("URL de Instagram inválida".into()),
            Effect::HideProgress
        ]
    );
}

#[test]
fn video_metadata_waits_for_format_confirmation() {
    init_logging();
    let state = CycleState::with_preselected_format(OutputFormat::Mp3);
    let (state, effects) = apply(
        state,
        vec![
            Msg::Submitted(URL.into()),
            Msg::MetadataLoaded(metadata(true)),
        ],
    );

    assert_eq!(state.phase(), Phase::AwaitingFormat);
    assert!(state.view().metadata.unwrap().show_format_selector);
    assert_eq!(
        &effects[1..],
        &[
            Effect::ShowMetadata(metadata(true)),
            Effect::PromptFormat {
                preselected: OutputFormat::Mp3
            },
        ]
    );

    // Nothing happens until the user confirms.
    let (state, effects) = update(state, Msg::NoOp);
    assert_eq!(state.phase(), Phase::AwaitingFormat);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::FormatConfirmed(OutputFormat::Mp3));
    assert_eq!(state.phase(), Phase::Downloading);
    assert_eq!(state.view().format, Some(OutputFormat::Mp3));
    assert_eq!(
        effects,
        vec![
            Effect::UpdateProgress(0),
            Effect::ShowStatus(StatusNotice::Starting),
            Effect::StartJob(ContentRequest {
                url: URL.into(),
                format: OutputFormat::Mp3,
            }),
        ]
    );
}

#[test]
fn non_video_skips_selector_and_uses_implicit_format() {
    init_logging();
    let state = CycleState::with_preselected_format(OutputFormat::Mp3);
    let (state, effects) = apply(
        state,
        vec![
            Msg::Submitted(URL.into()),
            Msg::MetadataLoaded(metadata(false)),
        ],
    );

    assert_eq!(state.phase(), Phase::Downloading);
    assert!(!state.view().metadata.unwrap().show_format_selector);
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::PromptFormat { .. })));
    assert!(effects.contains(&Effect::StartJob(ContentRequest {
        url: URL.into(),
        format: OutputFormat::Mp4,
    })));
}

#[test]
fn aborting_the_selector_fails_the_cycle() {
    init_logging();
    let (state, effects) = apply(
        CycleState::new(),
        vec![
            Msg::Submitted(URL.into()),
            Msg::MetadataLoaded(metadata(true)),
            Msg::FormatAborted,
        ],
    );

    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(state.error().map(|e| e.kind), Some(ErrorKind::Cancelled));
    assert!(effects.contains(&Effect::ShowError(FORMAT_ABORTED_MESSAGE.into())));
    assert!(!effects.contains(&Effect::StopPoller));
}

#[test]
fn progress_updates_ignore_regressions() {
    init_logging();
    let state = downloading(OutputFormat::Mp4);
    let (state, effects) = apply(
        state,
        vec![
            Msg::ProgressObserved(JobProgress::clamped(10)),
            Msg::ProgressObserved(JobProgress::clamped(45)),
            Msg::ProgressObserved(JobProgress::clamped(30)),
            Msg::ProgressObserved(JobProgress::clamped(45)),
            Msg::ProgressObserved(JobProgress::clamped(80)),
        ],
    );

    assert_eq!(
        effects,
        vec![
            Effect::UpdateProgress(10),
            Effect::UpdateProgress(45),
            Effect::UpdateProgress(80),
        ]
    );
    assert_eq!(state.view().progress, Some(80));
}

#[test]
fn poller_completion_shows_completed_status_once() {
    init_logging();
    let state = downloading(OutputFormat::Mp4);
    let (state, effects) = apply(
        state,
        vec![
            Msg::ProgressObserved(JobProgress::clamped(100)),
            Msg::PollerCompleted,
        ],
    );
    assert_eq!(
        effects,
        vec![
            Effect::UpdateProgress(100),
            Effect::ShowStatus(StatusNotice::Completed),
        ]
    );
    assert!(!state.view().poller_running);

    // Poller already stopped itself: the job outcome does not stop it again.
    let artifact = Artifact::new(vec![1u8, 2, 3], OutputFormat::Mp4);
    let (_state, effects) = update(state, Msg::JobSucceeded(artifact.clone()));
    assert_eq!(effects, vec![Effect::Deliver(artifact)]);
}

#[test]
fn job_success_stops_poller_and_forces_completion() {
    init_logging();
    let state = downloading(OutputFormat::Mp3);
    let artifact = Artifact::new(b"ID3".to_vec(), OutputFormat::Mp3);

    let (state, effects) = update(state, Msg::JobSucceeded(artifact.clone()));
    assert_eq!(
        effects,
        vec![
            Effect::StopPoller,
            Effect::UpdateProgress(100),
            Effect::ShowStatus(StatusNotice::Completed),
            Effect::Deliver(artifact.clone()),
        ]
    );
    assert_eq!(state.phase(), Phase::Downloading);
    assert_eq!(artifact.suggested_name, SUGGESTED_NAME);

    let (state, effects) = update(state, Msg::DeliveryCompleted { saved: true });
    assert_eq!(state.phase(), Phase::Delivered);
    assert_eq!(effects, vec![Effect::ShowStatus(StatusNotice::Delivered)]);
}

#[test]
fn cancelled_save_still_completes_cycle() {
    init_logging();
    let state = downloading(OutputFormat::Mp4);
    let (state, effects) = apply(
        state,
        vec![
            Msg::JobSucceeded(Artifact::new(vec![0u8], OutputFormat::Mp4)),
            Msg::DeliveryCompleted { saved: false },
        ],
    );
    assert_eq!(state.phase(), Phase::Delivered);
    assert_eq!(
        effects.last(),
        Some(&Effect::ShowStatus(StatusNotice::SaveCancelled))
    );
}

#[test]
fn job_failure_stops_poller_and_hides_progress() {
    init_logging();
    let state = downloading(OutputFormat::Mp4);
    let (state, _) = update(state, Msg::ProgressObserved(JobProgress::clamped(40)));

    let (state, effects) = update(
        state,
        Msg::JobFailed(OrchestrationError::remote("quota exceeded")),
    );
    assert_eq!(
        effects,
        vec![
            Effect::StopPoller,
            Effect::ShowError("quota exceeded".into()),
            Effect::HideProgress,
        ]
    );
    let view = state.view();
    assert_eq!(view.phase, Phase::Failed);
    assert_eq!(view.progress, None);
    assert!(!view.poller_running);

    // Late ticks after the failure change nothing.
    let (next, effects) = update(
        state.clone(),
        Msg::ProgressObserved(JobProgress::clamped(90)),
    );
    assert!(effects.is_empty());
    assert_eq!(next, state);
}

#[test]
fn delivery_failure_fails_cycle() {
    init_logging();
    let state = downloading(OutputFormat::Mp4);
    let (state, effects) = apply(
        state,
        vec![
            Msg::JobSucceeded(Artifact::new(vec![0u8], OutputFormat::Mp4)),
            Msg::DeliveryFailed(OrchestrationError::delivery("disk full")),
        ],
    );
    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(
        &effects[effects.len() - 2..],
        &[Effect::ShowError("disk full".into()), Effect::HideProgress]
    );
}

#[test]
fn submission_is_refused_while_a_cycle_runs() {
    init_logging();
    let state = downloading(OutputFormat::Mp4);
    let (next, effects) = update(state.clone(), Msg::Submitted("https://other".into()));
    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn new_cycle_after_failure_clears_previous_error() {
    init_logging();
    let (failed, _) = update(CycleState::new(), Msg::Submitted(" ".into()));
    assert_eq!(failed.phase(), Phase::Failed);

    let (state, effects) = update(failed, Msg::Submitted(URL.into()));
    assert_eq!(state.phase(), Phase::FetchingMetadata);
    assert_eq!(state.view().error, None);
    assert_eq!(
        effects,
        vec![
            Effect::ClearError,
            Effect::FetchMetadata { url: URL.into() }
        ]
    );
}

#[test]
fn dirty_flag_tracks_changes() {
    init_logging();
    let (mut state, _) = update(CycleState::new(), Msg::Submitted(URL.into()));
    assert!(state.view().dirty);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());

    let (mut state, _) = update(state, Msg::PollerCompleted);
    assert!(!state.consume_dirty());
}
