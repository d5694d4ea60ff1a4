use crate::{Artifact, ContentMetadata, ContentRequest, OutputFormat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchMetadata { url: String },
    ShowMetadata(ContentMetadata),
    /// Show the selector and wait for the user's confirmation.
    PromptFormat { preselected: OutputFormat },
    /// Start the job request and the progress poller together.
    StartJob(ContentRequest),
    StopPoller,
    Deliver(Artifact),
    UpdateProgress(u8),
    HideProgress,
    ShowStatus(StatusNotice),
    ShowError(String),
    ClearError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusNotice {
    Starting,
    Completed,
    Delivered,
    SaveCancelled,
}

impl StatusNotice {
    pub fn text(self) -> &'static str {
        match self {
            StatusNotice::Starting => "Iniciando descarga...",
            StatusNotice::Completed => "¡Descarga completada!",
            StatusNotice::Delivered => "Archivo guardado",
            StatusNotice::SaveCancelled => "Guardado cancelado",
        }
    }
}
