//! Reelgrab engine: service client, progress poller, artifact delivery and the cycle driver.
mod client;
mod delivery;
mod error;
mod orchestrator;
mod poller;
mod settings;
mod wire;

pub use client::{MediaService, ProgressSource, ReqwestMediaService};
pub use delivery::{
    ensure_output_dir, ArtifactDelivery, DeliveryError, DirectorySaveAction, SaveAction,
    SaveOutcome, StagedArtifact,
};
pub use error::{ClientError, FailureKind};
pub use orchestrator::{Collaborators, CycleReport, FormatPrompt, Orchestrator, UiSink};
pub use poller::{spawn_poller, PollerEvent, PollerHandle, PollerOutcome, PollerState};
pub use settings::{ClientSettings, DEFAULT_SERVER};
