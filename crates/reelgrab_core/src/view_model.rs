use crate::{MetadataView, OutputFormat, Phase};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleViewModel {
    pub phase: Phase,
    pub url: Option<String>,
    pub metadata: Option<MetadataView>,
    pub format: Option<OutputFormat>,
    /// `None` while the indicator is hidden.
    pub progress: Option<u8>,
    pub poller_running: bool,
    pub error: Option<String>,
    pub dirty: bool,
}
