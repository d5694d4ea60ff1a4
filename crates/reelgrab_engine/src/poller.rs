//! Recurring progress poller with a cancellation handle.
//!
//! The poller queries [`ProgressSource`] once per cadence tick (the first query
//! happens one cadence after start) and forwards each observation over a
//! channel. It ends on its own the first time it sees completion, or as soon as
//! its [`PollerHandle`] is stopped or dropped; a pending tick or in-flight
//! query is abandoned at that point.
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use reelgrab_core::JobProgress;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::ProgressSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerEvent {
    Progress(JobProgress),
    /// Completion observed; no further query will be issued.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerOutcome {
    pub state: PollerState,
    pub queries: u32,
}

/// Owner of a running poller. Dropping it cancels the poller.
pub struct PollerHandle {
    token: CancellationToken,
    state: watch::Receiver<PollerState>,
    task: Option<JoinHandle<PollerOutcome>>,
}

impl PollerHandle {
    /// Cancels the poller (a no-op if it already completed) and waits for it to wind down.
    pub async fn stop(self) -> PollerOutcome {
        self.token.cancel();
        self.join().await
    }

    /// Waits for the poller to end on its own.
    pub async fn join(mut self) -> PollerOutcome {
        let Some(task) = self.task.take() else {
            return PollerOutcome {
                state: PollerState::Cancelled,
                queries: 0,
            };
        };
        match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                engine_warn!("Progress poller task ended abnormally: {}", err);
                PollerOutcome {
                    state: PollerState::Cancelled,
                    queries: 0,
                }
            }
        }
    }

    pub fn state(&self) -> PollerState {
        *self.state.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Spawns the poller on the current tokio runtime.
pub fn spawn_poller(
    source: Arc<dyn ProgressSource>,
    cadence: Duration,
    events: mpsc::UnboundedSender<PollerEvent>,
) -> PollerHandle {
    let token = CancellationToken::new();
    let (state_tx, state) = watch::channel(PollerState::Idle);
    let task = tokio::spawn(run(source, cadence, events, token.clone(), state_tx));
    PollerHandle {
        token,
        state,
        task: Some(task),
    }
}

async fn run(
    source: Arc<dyn ProgressSource>,
    cadence: Duration,
    events: mpsc::UnboundedSender<PollerEvent>,
    token: CancellationToken,
    state_tx: watch::Sender<PollerState>,
) -> PollerOutcome {
    let mut ticker = interval_at(Instant::now() + cadence, cadence);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut queries = 0u32;

    let state = loop {
        tokio::select! {
            _ = token.cancelled() => break PollerState::Cancelled,
            _ = ticker.tick() => {}
        }
        state_tx.send_replace(PollerState::Polling);

        queries += 1;
        let result = tokio::select! {
            _ = token.cancelled() => break PollerState::Cancelled,
            result = source.query_progress() => result,
        };

        match result {
            Ok(progress) => {
                let _ = events.send(PollerEvent::Progress(progress));
                if progress.is_complete() {
                    let _ = events.send(PollerEvent::Completed);
                    break PollerState::Completed;
                }
            }
            Err(err) => {
                engine_warn!("Progress query {} failed: {}", queries, err);
            }
        }
    };

    state_tx.send_replace(state);
    engine_debug!("Progress poller ended state={:?} queries={}", state, queries);
    PollerOutcome { state, queries }
}
