//! Reelgrab core: pure orchestration state machine, domain types and display helpers.
mod display;
mod effect;
mod error;
mod msg;
mod state;
mod types;
mod update;
mod validate;
mod view_model;

pub use display::{format_date, format_duration, format_number, MetadataView};
pub use effect::{Effect, StatusNotice};
pub use error::{
    ErrorKind, OrchestrationError, EMPTY_URL_MESSAGE, FORMAT_ABORTED_MESSAGE,
    JOB_FALLBACK_MESSAGE, METADATA_FALLBACK_MESSAGE,
};
pub use msg::Msg;
pub use state::{CycleState, Phase};
pub use types::{
    Artifact, ContentMetadata, ContentRequest, JobProgress, OutputFormat, UnknownFormat,
    SUGGESTED_NAME, UNKNOWN,
};
pub use update::update;
pub use validate::validate_url;
pub use view_model::CycleViewModel;
