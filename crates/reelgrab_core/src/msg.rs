use crate::{Artifact, ContentMetadata, JobProgress, OrchestrationError, OutputFormat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted a locator; starts a fresh cycle.
    Submitted(String),
    /// Metadata query succeeded.
    MetadataLoaded(ContentMetadata),
    /// Metadata query failed.
    MetadataFailed(OrchestrationError),
    /// User confirmed a format in the selector.
    FormatConfirmed(OutputFormat),
    /// User dismissed the selector without choosing.
    FormatAborted,
    /// Poller observed a progress value.
    ProgressObserved(JobProgress),
    /// Poller saw completion and stopped itself.
    PollerCompleted,
    /// Job request returned a payload.
    JobSucceeded(Artifact),
    /// Job request failed.
    JobFailed(OrchestrationError),
    /// Save action returned; `saved` is false when the user cancelled it.
    DeliveryCompleted { saved: bool },
    /// Staging or saving the artifact failed.
    DeliveryFailed(OrchestrationError),
    NoOp,
}
